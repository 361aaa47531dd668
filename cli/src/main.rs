use std::process::{ExitCode, Termination};

use clap::Parser;
use keyring_smoke::{
    Failure, Keyring, Report, SmokeCheck,
    check::{DEFAULT_LABEL, DEFAULT_PASSWORD},
};
use tracing_subscriber::EnvFilter;

const BINARY_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Store a secret in the default keyring collection and check it reads back unchanged",
    after_help = format!(
        "Exit status is 0 on success, otherwise it names the failing step:\n  \
         3 connect, 4 collection, 5 create-item, 6 read-secret, 7 decode, 8 verify, 9 cleanup\n\n\
         Example:\n  {BINARY_NAME} --attribute ci-job 42 --delete"
    )
)]
struct Args {
    #[arg(long, default_value = DEFAULT_LABEL, help = "Label of the stored item")]
    label: String,
    #[arg(long, default_value = DEFAULT_PASSWORD, help = "Password to store and read back")]
    password: String,
    #[arg(
        long = "attribute",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        help = "Attribute attached to the item, can be repeated"
    )]
    attributes: Vec<String>,
    #[arg(long, help = "Delete the item once it was verified")]
    delete: bool,
}

impl Args {
    fn check(&self) -> SmokeCheck {
        self.attributes.chunks_exact(2).fold(
            SmokeCheck::new(&self.label, &self.password).delete_after(self.delete),
            |check, pair| check.attribute(&pair[0], &pair[1]),
        )
    }
}

enum Outcome {
    Passed(Report),
    Failed(Failure),
}

impl Outcome {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Passed(_) => 0,
            Self::Failed(err) => err.exit_code(),
        }
    }

    /// The single line reported for this outcome, on stdout when passed and
    /// on stderr when failed.
    fn message(&self) -> String {
        match self {
            Self::Passed(report) => format!("resolved_item_password: {}", report.password),
            Self::Failed(err) => format!("Error: {err}"),
        }
    }
}

impl Termination for Outcome {
    fn report(self) -> ExitCode {
        match &self {
            Self::Passed(_) => println!("{}", self.message()),
            Self::Failed(_) => eprintln!("{}", self.message()),
        }
        ExitCode::from(self.exit_code())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Outcome {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyring_smoke=info")),
        )
        .init();

    let args = Args::parse();
    let check = args.check();
    tracing::info!(label = check.label(), delete = args.delete, "Starting {BINARY_NAME}");

    match check.run(Keyring::dbus()).await {
        Ok(report) => {
            tracing::info!(item = %report.item, deleted = report.deleted, "Secret read back unchanged");
            Outcome::Passed(report)
        }
        Err(err) => Outcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use keyring_smoke::{Stage, memory};

    use super::*;

    #[test]
    fn command() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from([BINARY_NAME]).unwrap();
        assert_eq!(args.label, "label-123");
        assert_eq!(args.password, "password-123");
        assert!(args.attributes.is_empty());
        assert!(!args.delete);

        let check = args.check();
        assert_eq!(check.label(), "label-123");
        assert!(check.attributes().is_empty());
    }

    #[test]
    fn attributes_in_pairs() {
        let args = Args::try_parse_from([
            BINARY_NAME,
            "--attribute",
            "ci-job",
            "42",
            "--attribute",
            "runner",
            "linux",
        ])
        .unwrap();
        let check = args.check();
        assert_eq!(check.attributes().len(), 2);
        assert_eq!(check.attributes()["ci-job"], "42");
        assert_eq!(check.attributes()["runner"], "linux");
    }

    #[test]
    fn attribute_without_value() {
        let err = Args::try_parse_from([BINARY_NAME, "--attribute", "ci-job"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn failure_exit_code() {
        let service = memory::Service::unreachable();
        let err = SmokeCheck::default()
            .run(async { Keyring::memory(&service) })
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Connect);
        let outcome = Outcome::Failed(err);
        assert_eq!(outcome.exit_code(), 3);
        let message = outcome.message();
        assert!(message.starts_with("Error: Failed to connect to the Secret Service"));
        assert!(message.ends_with("The Secret Service is not reachable"));
        assert_eq!(message.lines().count(), 1);
    }

    #[tokio::test]
    async fn passed_exit_code() {
        let service = memory::Service::new();
        let args = Args::try_parse_from([BINARY_NAME, "--password", "hunter2", "--delete"]).unwrap();
        let report = args
            .check()
            .run(async { Keyring::memory(&service) })
            .await
            .unwrap();
        assert_eq!(report.password, "hunter2");
        assert!(service.items().is_empty());
        let outcome = Outcome::Passed(report);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.message(), "resolved_item_password: hunter2");
    }
}
