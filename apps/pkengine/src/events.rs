//! Event stream rendering

use pkengine_events::{EventMessage, ExitKind, TransactionEvent};
use pkengine_types::OutputFormat;
use tracing::Level;

/// Prints transaction events as they arrive
pub struct EventHandler {
    format: OutputFormat,
    /// Show progress and cancel-window events in plain mode
    verbose: bool,
}

impl EventHandler {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Handle one event, returning the exit kind once the stream finishes
    pub fn handle_event(&self, message: &EventMessage) -> Option<ExitKind> {
        log_event(message);

        match self.format {
            OutputFormat::Json => match serde_json::to_string(message) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "event not serializable"),
            },
            OutputFormat::Plain => {
                if let Some(line) = render(&message.event, self.verbose) {
                    if matches!(message.event, TransactionEvent::ErrorCode { .. }) {
                        eprintln!("{line}");
                    } else {
                        println!("{line}");
                    }
                }
            }
        }

        match message.event {
            TransactionEvent::Finished { exit } => Some(exit),
            _ => None,
        }
    }
}

/// Mirror an event into the log at the level its metadata carries
fn log_event(message: &EventMessage) {
    let meta = &message.meta;
    let transaction = meta.correlation_id.as_deref().unwrap_or_default();
    let role = meta.labels.get("role").map_or("", String::as_str);
    let source = meta.source.as_str();
    let sequence = meta.sequence;
    let event = &message.event;

    match meta.tracing_level() {
        Level::ERROR => tracing::error!(transaction, role, source, sequence, ?event, "event"),
        Level::WARN => tracing::warn!(transaction, role, source, sequence, ?event, "event"),
        Level::INFO => tracing::info!(transaction, role, source, sequence, ?event, "event"),
        Level::DEBUG => tracing::debug!(transaction, role, source, sequence, ?event, "event"),
        _ => tracing::trace!(transaction, role, source, sequence, ?event, "event"),
    }
}

/// One line of plain output for an event, if it has one at this verbosity
fn render(event: &TransactionEvent, verbose: bool) -> Option<String> {
    let line = match event {
        TransactionEvent::Status { status } => format!("status: {status}"),
        TransactionEvent::Percentage { percentage } if verbose => {
            format!("progress: {percentage}")
        }
        TransactionEvent::SubPercentage { percentage } if verbose => {
            format!("sub-progress: {percentage}")
        }
        TransactionEvent::AllowCancel { allowed } if verbose => {
            format!("cancel allowed: {allowed}")
        }
        TransactionEvent::Percentage { .. }
        | TransactionEvent::SubPercentage { .. }
        | TransactionEvent::AllowCancel { .. } => return None,
        TransactionEvent::Package(package) => {
            format!("{:<12} {}  {}", package.info, package.id, package.summary)
        }
        TransactionEvent::Details(details) => format!(
            "{}\n  license: {}\n  group: {}\n  url: {}\n  size: {}\n  {}",
            details.id,
            details.license,
            details.group,
            details.url,
            details.size,
            details.description
        ),
        TransactionEvent::Files { package_id, files } => {
            let owner = package_id
                .as_ref()
                .map_or_else(|| "downloaded".to_string(), ToString::to_string);
            format!("{owner}:\n  {}", files.join("\n  "))
        }
        TransactionEvent::UpdateDetail(detail) => {
            let updates: Vec<String> = detail.updates.iter().map(ToString::to_string).collect();
            format!(
                "{} updates [{}], restart {}\n  {}",
                detail.id,
                updates.join(", "),
                detail.restart,
                detail.update_text
            )
        }
        TransactionEvent::DistroUpgrade(upgrade) => {
            format!("upgrade: {} ({})", upgrade.name, upgrade.summary)
        }
        TransactionEvent::RepoDetail(repo) => {
            let state = if repo.enabled { "enabled" } else { "disabled" };
            format!("{:<20} {:<9} {}", repo.id, state, repo.description)
        }
        TransactionEvent::RepoSignatureRequired(req) => format!(
            "signature required for {}: key {} ({}) from {}\n  run: pkengine install-signature {} '{}'",
            req.package_id,
            req.key_id,
            req.key_userid,
            req.repository_name,
            req.key_id,
            req.package_id
        ),
        TransactionEvent::EulaRequired(req) => format!(
            "license {} from {} must be accepted for {}\n  {}\n  run: pkengine accept-eula {}",
            req.eula_id, req.vendor_name, req.package_id, req.license_agreement, req.eula_id
        ),
        TransactionEvent::RequireRestart {
            restart,
            package_id,
        } => match package_id {
            Some(id) => format!("restart required ({restart}) for {id}"),
            None => format!("restart required ({restart})"),
        },
        TransactionEvent::Message { message } => format!("note: {message}"),
        TransactionEvent::ErrorCode { code, message } => format!("Error [{code}]: {message}"),
        TransactionEvent::Finished { exit } => format!("finished: {exit}"),
    };
    Some(line)
}
