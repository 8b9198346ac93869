//! Tracing (logging)

use crate::cli::CommandLineArgs;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Initlialise tracing (logging)
///
/// Applies a filter based on the `RUST_LOG` environment variable, falling back to enable debug
/// logging for this crate and tower_http if not set. Traces are also exported to a Jaeger agent
/// when enabled on the command line.
///
/// # Arguments
///
/// * `args`: Command line arguments
pub fn init_tracing(args: &CommandLineArgs) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "boss_ingest=debug,tower_http=debug".into());

    let jaeger_layer = if args.enable_jaeger {
        match opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name("boss-ingest")
            .install_simple()
        {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed()),
            Err(err) => {
                eprintln!("failed to install Jaeger pipeline, traces will not be exported: {err}");
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(jaeger_layer)
        .init();
}

/// Flush and shut down any trace exporters.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
