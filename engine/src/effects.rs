//! Side-effect collaborators driven by command chords.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Lines(Vec<String>),
    Cancelled,
}

pub type EffectFut<T> = Pin<Box<dyn Future<Output = Result<T, EffectError>> + Send + 'static>>;

pub trait SystemEffects: Send + Sync {
    fn quit(&self) -> EffectFut<()>;
    fn copy_to_clipboard(&self, text: String) -> EffectFut<()>;
    fn save_to_file(&self, lines: Vec<String>) -> EffectFut<SaveOutcome>;
    fn load_from_file(&self) -> EffectFut<LoadOutcome>;
}
