use callintel_core::BackendError;
use std::fmt;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => f.write_str("unloaded"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Load state of one backend's model. Owned by the invoker and consulted
/// before every call; only `Ready` lets an invocation through.
#[derive(Debug)]
pub struct ModelLifecycle {
    state: RwLock<ModelState>,
}

impl ModelLifecycle {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ModelState::Unloaded),
        }
    }

    /// A lifecycle that starts in `Ready`, for backends with nothing to load
    /// and for stubs in tests.
    pub fn ready() -> Self {
        Self {
            state: RwLock::new(ModelState::Ready),
        }
    }

    pub fn state(&self) -> ModelState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ModelState::Ready
    }

    /// Move to `Loading`. Returns `false` when a load is already in flight or
    /// the model is ready, in which case the caller must not load again.
    pub fn begin_loading(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            ModelState::Loading | ModelState::Ready => false,
            ModelState::Unloaded | ModelState::Failed(_) => {
                *state = ModelState::Loading;
                true
            }
        }
    }

    pub fn mark_ready(&self) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = ModelState::Ready;
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = ModelState::Failed(reason.into());
    }

    pub fn check_ready(&self) -> Result<(), BackendError> {
        match self.state() {
            ModelState::Ready => Ok(()),
            other => Err(BackendError::ModelUnavailable(format!("model is {other}"))),
        }
    }
}

impl Default for ModelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
