//! Checks spanning more than one configuration section.

use validator::ValidationError;

use crate::dispatch::{DispatchConfig, SchedulerConfig};

/// The deferred callback priority must name one of the scheduler's levels.
pub fn validate_dispatch_priority(
    dispatch: &DispatchConfig,
    scheduler: &SchedulerConfig,
) -> Result<(), ValidationError> {
    if usize::from(dispatch.priority) < scheduler.priority_levels {
        Ok(())
    } else {
        Err(ValidationError::new("priority_out_of_range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_must_fit_levels() {
        let scheduler = SchedulerConfig {
            workers: 1,
            priority_levels: 2,
        };
        let mut dispatch = DispatchConfig::default();
        assert!(validate_dispatch_priority(&dispatch, &scheduler).is_ok());

        dispatch.priority = 2;
        let err = validate_dispatch_priority(&dispatch, &scheduler).unwrap_err();
        assert_eq!(err.code, "priority_out_of_range");
    }
}
