use std::sync::{Mutex, PoisonError};

/// The best `(score, model)` pair seen by any worker of a parallel consensus search. Updates are a compare-and-set
/// under a mutex: a model only replaces the stored one if its score is strictly higher. Which of several
/// equal-scoring models survives depends on the order in which workers reach the lock.
pub(crate) struct SharedBest<M> {
    best: Mutex<Option<(usize, M)>>,
}

impl<M> SharedBest<M> {
    pub(crate) fn new() -> Self {
        Self {
            best: Mutex::new(None),
        }
    }

    /// Offers `model` with the given `score`. Returns `true` if it became the new best model
    pub(crate) fn offer(&self, score: usize, model: M) -> bool {
        // A worker only panics between lock and unlock if `M`'s destructor panics, the pair is still consistent then
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        match &*best {
            Some((best_score, _)) if *best_score >= score => false,
            _ => {
                *best = Some((score, model));
                true
            }
        }
    }

    pub(crate) fn into_inner(self) -> Option<(usize, M)> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
