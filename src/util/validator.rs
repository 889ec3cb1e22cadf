use error_stack::Report;
use thiserror::Error;
use validator::ValidateError;

#[derive(Debug, Error)]
#[error("Invalid given data occurred")]
pub struct Wrapper;

pub trait IntoValidatorReport<T> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper>;
}

impl<T> IntoValidatorReport<T> for Result<T, ValidateError> {
    fn into_validator_report(self) -> error_stack::Result<T, Wrapper> {
        fn read_errors<'a>(
            err: &'a ValidateError,
            fields_queue: &mut Vec<&'a str>,
            mut report: Report<Wrapper>,
        ) -> Report<Wrapper> {
            match err {
                ValidateError::Fields(fields) => {
                    for (field, data) in fields {
                        fields_queue.push(field.as_ref());
                        report = read_errors(data, fields_queue, report);
                        fields_queue.pop();
                    }
                    report
                }
                ValidateError::Messages(messages) => {
                    let field_str = fields_queue.join(".");
                    for message in messages {
                        report = report.attach_printable(format!("{field_str}: {message}"));
                    }
                    report
                }
            }
        }

        self.map_err(|v| {
            let mut queue = Vec::new();
            read_errors(&v, &mut queue, Report::new(Wrapper))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attaches_field_paths() {
        let mut db = ValidateError::field_builder();
        db.insert("url", ValidateError::message("Invalid Postgres connection URL"));

        let mut fields = ValidateError::field_builder();
        fields.insert("db", db.build());

        let result: Result<(), ValidateError> = Err(fields.build());
        let report = result.into_validator_report().unwrap_err();
        let messages = format!("{report:?}");
        assert!(messages.contains("db.url: Invalid Postgres connection URL"));
    }
}
