//! Shell-script stand-ins for FFmpeg tools.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write an executable `/bin/sh` script named `name` into `dir` and return
/// its path. The script sees the tool's arguments as `$@`; `$out` holds the
/// last one, which is the output path for FFmpeg.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\nfor arg in \"$@\"; do out=\"$arg\"; done\n{}\n",
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}
