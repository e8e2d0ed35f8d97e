//! Cartesian job enumeration.
//!
//! Hooks are the outer loop, voices the middle and bodies the inner one,
//! each in upload order. With no bodies every hook/voice pair still yields
//! one body-less job.

use clipstorm_models::{Asset, Job};

/// Lazy iterator over every job of a batch.
#[derive(Debug, Clone)]
pub struct JobEnumerator<'a> {
    hooks: &'a [Asset],
    voices: &'a [Asset],
    bodies: &'a [Asset],
    next: usize,
    total: usize,
}

impl<'a> JobEnumerator<'a> {
    pub fn new(hooks: &'a [Asset], voices: &'a [Asset], bodies: &'a [Asset]) -> Self {
        let total = hooks.len() * voices.len() * bodies.len().max(1);
        Self {
            hooks,
            voices,
            bodies,
            next: 0,
            total,
        }
    }

    /// Job at `index`, without advancing.
    pub fn job_at(&self, index: usize) -> Option<Job> {
        if index >= self.total {
            return None;
        }
        let per_body = self.bodies.len().max(1);
        let per_voice = per_body;
        let per_hook = self.voices.len() * per_voice;

        let hook = &self.hooks[index / per_hook];
        let voice = &self.voices[(index % per_hook) / per_voice];
        let body = self.bodies.get(index % per_body).cloned();

        Some(Job::new(index, hook.clone(), voice.clone(), body))
    }
}

impl Iterator for JobEnumerator<'_> {
    type Item = Job;

    fn next(&mut self) -> Option<Job> {
        let job = self.job_at(self.next)?;
        self.next += 1;
        Some(job)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for JobEnumerator<'_> {}

/// Enumerate the jobs for the given uploads.
pub fn enumerate_jobs<'a>(
    hooks: &'a [Asset],
    voices: &'a [Asset],
    bodies: &'a [Asset],
) -> JobEnumerator<'a> {
    JobEnumerator::new(hooks, voices, bodies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstorm_models::AssetKind;

    fn assets(names: &[&str], kind: AssetKind) -> Vec<Asset> {
        names
            .iter()
            .map(|n| Asset::from_bytes(*n, kind, Vec::<u8>::new()))
            .collect()
    }

    fn labels(jobs: impl Iterator<Item = Job>) -> Vec<String> {
        jobs.map(|j| j.label()).collect()
    }

    #[test]
    fn test_hooks_outer_voices_inner() {
        let hooks = assets(&["A", "B"], AssetKind::Hook);
        let voices = assets(&["x", "y"], AssetKind::Voice);

        let jobs = enumerate_jobs(&hooks, &voices, &[]);
        assert_eq!(jobs.len(), 4);
        assert_eq!(
            labels(jobs),
            vec!["A + x", "A + y", "B + x", "B + y"]
        );
    }

    #[test]
    fn test_bodies_innermost() {
        let hooks = assets(&["A"], AssetKind::Hook);
        let voices = assets(&["x", "y"], AssetKind::Voice);
        let bodies = assets(&["1", "2"], AssetKind::Body);

        let jobs: Vec<Job> = enumerate_jobs(&hooks, &voices, &bodies).collect();
        assert_eq!(
            labels(jobs.clone().into_iter()),
            vec!["A + x + 1", "A + x + 2", "A + y + 1", "A + y + 2"]
        );
        let indices: Vec<usize> = jobs.iter().map(|j| j.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_no_bodies_means_no_body() {
        let hooks = assets(&["A"], AssetKind::Hook);
        let voices = assets(&["x"], AssetKind::Voice);

        let jobs: Vec<Job> = enumerate_jobs(&hooks, &voices, &[]).collect();
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].body.is_none());
    }

    #[test]
    fn test_exact_size_shrinks() {
        let hooks = assets(&["A", "B", "C"], AssetKind::Hook);
        let voices = assets(&["x"], AssetKind::Voice);
        let bodies = assets(&["1", "2"], AssetKind::Body);

        let mut jobs = enumerate_jobs(&hooks, &voices, &bodies);
        assert_eq!(jobs.len(), 6);
        jobs.next();
        jobs.next();
        assert_eq!(jobs.len(), 4);
        assert!(jobs.job_at(6).is_none());
    }

    #[test]
    fn test_empty_hooks_yield_nothing() {
        let voices = assets(&["x"], AssetKind::Voice);
        let mut jobs = enumerate_jobs(&[], &voices, &[]);
        assert_eq!(jobs.len(), 0);
        assert!(jobs.next().is_none());
    }
}
