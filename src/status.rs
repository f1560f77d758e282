use std::{fmt, path::PathBuf};

/// Phase transitions reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Started { file: String },
    AbortRequested,
    Cancelled,
    Completed { saved_to: PathBuf },
    SaveDeclined,
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Started { file } => {
                write!(f, "🚀 Processing has started for the file {}", file)
            }
            Status::AbortRequested => write!(f, "🛑 Abort requested... Attempting to stop."),
            Status::Cancelled => write!(f, "⚠️  Processing was aborted by user."),
            Status::Completed { saved_to } => write!(
                f,
                "✅ Processing completed successfully. Saved to {}",
                saved_to.display()
            ),
            Status::SaveDeclined => write!(f, "💾 Save operation was canceled by the user."),
            Status::Failed(message) => write!(f, "❌ Error during processing: {}", message),
        }
    }
}
