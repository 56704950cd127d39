//! CLI Exit Code Registry
//!
//! Single source of truth for the exit codes of `regtrim`. Scripts that
//! run nightly batches rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error (bad arguments)                              |
//! | 3    | Input file cannot be read, written or is not valid CSV   |
//! | 4    | Classifier config invalid                                |
//! | 5    | A record carries a code or value the classifier rejects  |
//! | 6    | A record matched no price list entry                     |
//! | 7    | A statistics file cannot be parsed                       |

use regtrim_classifier::ClassifyError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unparseable option values.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read/write a file, or the records file lacks a column.
pub const EXIT_INPUT: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 4;

/// Unknown variant, trim, type approval or colour; bad price or date.
pub const EXIT_RECORD_INVALID: u8 = 5;

/// No price list in force, or no entry matched.
pub const EXIT_RECORD_UNRESOLVED: u8 = 6;

/// Statistics file holds an unknown counter or is not a counter map.
pub const EXIT_STATS_INVALID: u8 = 7;

/// Map a classifier error to its exit code.
pub fn classify_exit_code(err: &ClassifyError) -> u8 {
    match err {
        ClassifyError::UnknownVariant { .. }
        | ClassifyError::UnknownTrimCode { .. }
        | ClassifyError::UnknownTypeApproval { .. }
        | ClassifyError::UnknownColor { .. }
        | ClassifyError::InvalidPrice { .. }
        | ClassifyError::InvalidDate { .. }
        | ClassifyError::DateOutOfRange { .. }
        | ClassifyError::WheelSizeNotOffered { .. } => EXIT_RECORD_INVALID,
        ClassifyError::NoPriceList { .. } | ClassifyError::Unresolved { .. } => {
            EXIT_RECORD_UNRESOLVED
        }
        ClassifyError::ConfigParse(_) | ClassifyError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        ClassifyError::CounterParse { .. } => EXIT_STATS_INVALID,
        ClassifyError::MissingColumn { .. } | ClassifyError::Io(_) => EXIT_INPUT,
    }
}
