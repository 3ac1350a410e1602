use thiserror::Error;

/// Failure reported by an OS reachability primitive.
///
/// Every variant except [`BridgeError::NotAvailable`] carries the numeric
/// diagnostic code the platform attached to the failure. Codes are expected to
/// vary spuriously between otherwise identical failures, so consumers that need
/// to compare failures should compare [`BridgeError::kind`] instead.
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Unable to create a reachability handle for {target} (code {code})")]
    CreationFailed { target: String, code: i32 },

    #[error("Unable to register the reachability callback (code {code})")]
    CallbackRegistrationFailed { code: i32 },

    #[error("Unable to schedule reachability callback delivery (code {code})")]
    DeliverySchedulingFailed { code: i32 },

    #[error("Unable to query current reachability facts (code {code})")]
    FactsQueryFailed { code: i32 },

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),
}

/// Payload-free classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Creation,
    CallbackRegistration,
    DeliveryScheduling,
    FactsQuery,
    NotAvailable,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::CreationFailed { .. } => ErrorKind::Creation,
            BridgeError::CallbackRegistrationFailed { .. } => ErrorKind::CallbackRegistration,
            BridgeError::DeliverySchedulingFailed { .. } => ErrorKind::DeliveryScheduling,
            BridgeError::FactsQueryFailed { .. } => ErrorKind::FactsQuery,
            BridgeError::NotAvailable(_) => ErrorKind::NotAvailable,
        }
    }

    /// Platform diagnostic code, if the failure carries one.
    pub fn code(&self) -> Option<i32> {
        match self {
            BridgeError::CreationFailed { code, .. }
            | BridgeError::CallbackRegistrationFailed { code }
            | BridgeError::DeliverySchedulingFailed { code }
            | BridgeError::FactsQueryFailed { code } => Some(*code),
            BridgeError::NotAvailable(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
