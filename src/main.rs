use std::env;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::{info, warn};
use once_cell::sync::Lazy;
use relay_engine::data::{parse, SOURCE_NAME, TARGET_NAME};
use relay_engine::{GeoPosition, Locate, Location, RouteStrategy, Router};
use serde::{Deserialize, Serialize};

/// Settings read once per cold start.
#[derive(Debug, Clone)]
struct EngineConfig {
    default_strategy: RouteStrategy,
}

impl EngineConfig {
    fn from_env() -> Self {
        let default_strategy = match env::var("RELAY_STRATEGY") {
            Ok(raw) => raw.parse::<RouteStrategy>().unwrap_or_else(|err| {
                warn!("{}; using {}", err, RouteStrategy::default());
                RouteStrategy::default()
            }),
            Err(_) => RouteStrategy::default(),
        };
        EngineConfig { default_strategy }
    }
}

static CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::from_env);

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    /// A challenge in the line-oriented text format.
    Challenge {
        data: String,
        #[serde(default)]
        strategy: Option<RouteStrategy>,
    },
    Route {
        source: GeoPosition,
        target: GeoPosition,
        #[serde(default)]
        relays: Vec<NamedPosition>,
        #[serde(default)]
        strategy: Option<RouteStrategy>,
    },
}

#[derive(Debug, Deserialize)]
struct NamedPosition {
    name: String,
    #[serde(flatten)]
    position: GeoPosition,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Route {
        algorithm: RouteStrategy,
        path: Option<Vec<RouteStop>>,
        hops: usize,
        distance: f64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct RouteStop {
    name: String,
    #[serde(flatten)]
    position: GeoPosition,
}

fn answer(request: EngineRequest, config: &EngineConfig) -> EngineResponse {
    let (source, target, relays, strategy) = match request {
        EngineRequest::Challenge { data, strategy } => match parse(&data) {
            Ok(challenge) => (
                challenge.source,
                challenge.target,
                challenge.relays,
                strategy,
            ),
            Err(err) => {
                return EngineResponse::Error {
                    message: err.to_string(),
                }
            }
        },
        EngineRequest::Route {
            source,
            target,
            relays,
            strategy,
        } => (
            Location::new(SOURCE_NAME, source),
            Location::new(TARGET_NAME, target),
            relays
                .into_iter()
                .map(|relay| Location::new(relay.name, relay.position))
                .collect(),
            strategy,
        ),
    };

    let algorithm = strategy.unwrap_or(config.default_strategy);
    info!("{} relay(s), strategy {}", relays.len(), algorithm);

    let route = Router::new(algorithm, relays).route(&source, &target);
    EngineResponse::Route {
        algorithm,
        path: route.path.map(|points| {
            points
                .iter()
                .map(|point| RouteStop {
                    name: point.name().to_string(),
                    position: point.geo(),
                })
                .collect()
        }),
        hops: route.hops,
        distance: route.distance,
    }
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    Ok(answer(event.payload, &CONFIG))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    info!(
        "relay engine ready, default strategy {}",
        CONFIG.default_strategy
    );
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}
