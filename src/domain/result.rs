//! Result type alias for the uploader
//!
//! This module provides a convenient Result type alias that uses UploaderError
//! as the error type.

use super::errors::UploaderError;

/// Result type alias for uploader operations
///
/// # Examples
///
/// ```
/// use invoice_uploader::domain::result::Result;
/// use invoice_uploader::domain::errors::UploaderError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(UploaderError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, UploaderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::UploaderError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(UploaderError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
