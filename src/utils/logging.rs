use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use wrike::audit_log::{AuditLogResult, StopReason};

/// Inicializa o tracing em stderr (stdout fica reservado para os dados)
///
/// `RUST_LOG` tem precedência; sem ele, `verbose` escolhe entre debug e info.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_export_finished(what: &str, count: usize) {
    info!("✅ Export concluído: {} registro(s) de {}", count, what);
}

pub fn log_audit_result(result: &AuditLogResult) {
    match &result.stop {
        StopReason::Exhausted => info!(
            "✅ Audit log completo: {} entrada(s) em {} página(s) ({:.2?})",
            result.entries.len(),
            result.pages,
            result.elapsed
        ),
        StopReason::IterationCap => warn!(
            "⚠️ Audit log interrompido pelo limite de páginas: {} entrada(s) em {} página(s)",
            result.entries.len(),
            result.pages
        ),
        StopReason::Failed(err) => error!(
            "❌ Audit log interrompido por erro ({}): {} - {} entrada(s) parciais",
            err.class(),
            err,
            result.entries.len()
        ),
    }
}

pub fn log_dotenv_missing() {
    debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
}
