//! Error types for external collaborator failures.
//!
//! Collaborator failures are recoverable from the coordinator's point of
//! view: translation and image errors leave the item untouched for the next
//! scan, posting errors revert the item to `approved`, and notification
//! errors are logged and dropped.

macro_rules! collaborator_error {
    ($name:ident, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
        #[display("{} Error: {} at line {} in {}", $label, message, line, file)]
        pub struct $name {
            /// The underlying error message
            pub message: String,
            /// Line number where the error occurred
            pub line: u32,
            /// File where the error occurred
            pub file: &'static str,
        }

        impl $name {
            /// Create a new error with the given message at the current location.
            #[track_caller]
            pub fn new(message: impl Into<String>) -> Self {
                let location = std::panic::Location::caller();
                Self {
                    message: message.into(),
                    line: location.line(),
                    file: location.file(),
                }
            }
        }
    };
}

collaborator_error!(
    TranslationError,
    "Translation",
    "Failure reported by the external translator."
);
collaborator_error!(
    ImageFetchError,
    "Image Fetch",
    "Failure reported by the external image source."
);
collaborator_error!(
    PostingError,
    "Posting",
    "Failure reported by an external platform poster."
);
collaborator_error!(
    NotifyError,
    "Notification",
    "Failure reported by the notifier. Fire-and-forget; never propagated."
);
