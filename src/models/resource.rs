use crate::error::ErrorCode;

/// Tri-state result published to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(ErrorCode),
}

impl<T> Resource<T> {
    pub fn success(self) -> Option<T> {
        match self {
            Resource::Success(value) => Some(value),
            Resource::Loading | Resource::Error(_) => None,
        }
    }
}
