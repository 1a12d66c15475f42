mod apperror;
pub mod layerapihandler;

pub use apperror::AppError;

type Error = agririsk::Error;
type Result<T> = agririsk::Result<T>;
