use qcm_runner::{init_logging, QuotaChangeRunner, RunnerConfig, RunnerError};

fn main() -> Result<(), RunnerError> {
    let config = RunnerConfig::from_env()?;
    init_logging(config.log_format)?;
    QuotaChangeRunner::new(config).run()?;
    Ok(())
}
