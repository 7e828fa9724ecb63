//! steady-redis command line client
//!
//! Issues one command against a server through [`steady_redis::Client`], so
//! the connect, retry and backoff behaviour is the same as in an application.
//!
//! The `clap` crate is used for parsing arguments.

use steady_redis::{Client, ClientConfig, Command as RawCommand, DEFAULT_PORT};

use bytes::Bytes;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::num::ParseIntError;
use std::str;
use std::time::Duration;

#[cfg(feature = "otel")]
use opentelemetry::global;
#[cfg(feature = "otel")]
use opentelemetry::sdk::trace as sdktrace;
#[cfg(feature = "otel")]
use opentelemetry_aws::trace::XrayPropagator;
#[cfg(feature = "otel")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[clap(
    name = "steady-redis-cli",
    version,
    author,
    about = "Issue Redis commands"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(name = "hostname", long, default_value = "127.0.0.1")]
    host: String,

    #[clap(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Password sent with AUTH on connect
    #[clap(long, default_value = "")]
    password: String,

    /// Database index selected on connect
    #[clap(long, default_value_t = 0)]
    db: u32,

    /// Microseconds to wait after a crash before reconnecting
    #[clap(long, value_parser = duration_from_us_str, default_value = "1000000")]
    reconnect_interval_us: Duration,

    /// Connect timeout in microseconds, 0 for none
    #[clap(long, value_parser = duration_from_us_str, default_value = "1000000000")]
    connect_timeout_us: Duration,

    /// Per-command timeout in microseconds, 0 for none
    #[clap(long, value_parser = duration_from_us_str, default_value = "1000000000")]
    operation_timeout_us: Duration,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get the value of key
    Get { key: String },
    /// Set key to hold value
    Set {
        key: String,
        #[clap(value_parser = bytes_from_str)]
        value: Bytes,
    },
    /// Remove keys
    Del {
        #[clap(required = true)]
        keys: Vec<String>,
    },
    /// Check whether key exists
    Exists { key: String },
    /// Increment the integer at key
    Incr { key: String },
    /// Get a field of a hash
    Hget { key: String, field: String },
    /// Set a field of a hash
    Hset {
        key: String,
        field: String,
        #[clap(value_parser = bytes_from_str)]
        value: Bytes,
    },
    /// Get every field and value of a hash
    Hgetall { key: String },
    /// Push values onto the head of a list
    Lpush {
        key: String,
        #[clap(required = true, value_parser = bytes_from_str)]
        values: Vec<Bytes>,
    },
    /// Get a range of list elements
    Lrange {
        key: String,
        #[clap(allow_hyphen_values = true)]
        start: i64,
        #[clap(allow_hyphen_values = true)]
        stop: i64,
    },
    /// Add members to a set
    Sadd {
        key: String,
        #[clap(required = true, value_parser = bytes_from_str)]
        members: Vec<Bytes>,
    },
    /// Get every member of a set
    Smembers { key: String },
    /// Add a member with a score to a sorted set
    Zadd {
        key: String,
        #[clap(allow_hyphen_values = true)]
        score: f64,
        #[clap(value_parser = bytes_from_str)]
        member: Bytes,
    },
    /// Get a range of sorted set members with their scores
    Zrange {
        key: String,
        #[clap(allow_hyphen_values = true)]
        start: i64,
        #[clap(allow_hyphen_values = true)]
        stop: i64,
    },
    /// Send any command and print the raw reply
    Raw {
        #[clap(required = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// The client drives its own runtime, so `main` stays synchronous.
fn main() -> CliResult<()> {
    set_up_logging()?;

    let cli = Cli::parse();

    let config = ClientConfig::new(cli.host, cli.port)
        .password(cli.password)
        .database(cli.db)
        .reconnection_interval(cli.reconnect_interval_us)
        .connection_timeout(cli.connect_timeout_us)
        .operation_timeout(cli.operation_timeout_us);
    let mut client = Client::new(config);

    match cli.command {
        Command::Get { key } => print_optional(client.get(&key)?),
        Command::Set { key, value } => {
            client.set(&key, value)?;
            println!("OK");
        }
        Command::Del { keys } => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            println!("(integer) {}", client.del(&keys)?);
        }
        Command::Exists { key } => println!("(integer) {}", client.exists(&key)? as u8),
        Command::Incr { key } => println!("(integer) {}", client.incr(&key)?),
        Command::Hget { key, field } => print_optional(client.hget(&key, &field)?),
        Command::Hset { key, field, value } => {
            println!("(integer) {}", client.hset(&key, &field, value)? as u8)
        }
        Command::Hgetall { key } => {
            let pairs = client.hgetall(&key)?;
            if pairs.is_empty() {
                println!("(empty array)");
            }
            for (field, value) in pairs {
                println!("{} => {}", quoted(&field), quoted(&value));
            }
        }
        Command::Lpush { key, values } => println!("(integer) {}", client.lpush(&key, &values)?),
        Command::Lrange { key, start, stop } => print_list(client.lrange(&key, start, stop)?),
        Command::Sadd { key, members } => println!("(integer) {}", client.sadd(&key, &members)?),
        Command::Smembers { key } => print_list(client.smembers(&key)?),
        Command::Zadd { key, score, member } => {
            println!("(integer) {}", client.zadd(&key, &[(score, member)])?)
        }
        Command::Zrange { key, start, stop } => {
            let scored = client.zrange(&key, start, stop)?;
            if scored.is_empty() {
                println!("(empty array)");
            }
            for (i, (member, score)) in scored.iter().enumerate() {
                println!("{}) {} ({})", i + 1, quoted(member), score);
            }
        }
        Command::Raw { args } => {
            let mut parts = args.into_iter();
            let name = parts.next().unwrap_or_default().to_uppercase();
            let command = RawCommand::new(name).args(parts);
            println!("{}", client.execute(&command)?);
        }
    }

    Ok(())
}

fn print_optional(value: Option<Bytes>) {
    match value {
        Some(value) => println!("{}", quoted(&value)),
        None => println!("(nil)"),
    }
}

fn print_list(values: Vec<Bytes>) {
    if values.is_empty() {
        println!("(empty array)");
    }
    for (i, value) in values.iter().enumerate() {
        println!("{}) {}", i + 1, quoted(value));
    }
}

fn quoted(value: &Bytes) -> String {
    match str::from_utf8(value) {
        Ok(string) => format!("\"{}\"", string),
        Err(_) => format!("{:?}", value),
    }
}

fn duration_from_us_str(src: &str) -> Result<Duration, ParseIntError> {
    let us = src.parse::<u64>()?;
    Ok(Duration::from_micros(us))
}

fn bytes_from_str(src: &str) -> Result<Bytes, Infallible> {
    Ok(Bytes::from(src.to_string()))
}

#[cfg(not(feature = "otel"))]
fn set_up_logging() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
}

#[cfg(feature = "otel")]
fn set_up_logging() -> CliResult<()> {
    // Keep the X-Ray trace id when the CLI is called from a traced service.
    global::set_text_map_propagator(XrayPropagator::default());

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic())
        .with_trace_config(
            sdktrace::config()
                .with_sampler(sdktrace::Sampler::AlwaysOn)
                // Trace ids must be in the X-Ray format
                .with_id_generator(sdktrace::XrayIdGenerator::default()),
        )
        .install_simple()?;

    let opentelemetry = tracing_opentelemetry::layer().with_tracer(tracer);

    // Parse an `EnvFilter` configuration from the `RUST_LOG` environment variable.
    let filter = EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(opentelemetry)
        .with(filter)
        .with(fmt::Layer::default().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
