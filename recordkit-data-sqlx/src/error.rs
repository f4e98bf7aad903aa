use recordkit_data::DataError;

/// Converts `sqlx::Error` into the backend-neutral [`DataError`].
///
/// `DataError` lives in `recordkit-data`, so the conversion is an extension
/// method rather than a `From` impl.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match self {
            sqlx::Error::RowNotFound => DataError::NotFound("no matching row".into()),
            sqlx::Error::ColumnDecode { index, source } => {
                DataError::Mapping(format!("column {index} could not be decoded: {source}"))
            }
            sqlx::Error::Decode(source) => DataError::Mapping(source.to_string()),
            other => DataError::database(other),
        }
    }
}
