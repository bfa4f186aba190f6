use crate::generator::profile::{build_scenario, GeneratorConfig};
use crate::gui_bridge::model::SarViewModel;
use crate::workflow::config::ScenarioConfig;
use crate::workflow::runner::Runner;
use anyhow::Result;
use log::{error, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

type SharedModel = Arc<RwLock<SarViewModel>>;

/// Runs a scenario off the async executor; the runner may spin up its own
/// projection pool.
async fn run_scenario(
    runner: Arc<Runner>,
    scenario: ScenarioConfig,
    state: SharedModel,
    note: Option<String>,
) -> Result<SarViewModel> {
    let result = tokio::task::spawn_blocking(move || runner.execute(&scenario)).await??;
    let mut model = SarViewModel::from_result(&result);
    model.notes.extend(note);
    match state.write() {
        Ok(mut guard) => *guard = model.clone(),
        Err(_) => warn!("view model lock poisoned, result not stored"),
    }
    Ok(model)
}

fn ok_reply(model: &SarViewModel, description: Option<String>) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({
            "status": "ok",
            "datum": model.datum,
            "search_area_nm2": model.search_area_nm2,
            "description": description.unwrap_or_default()
        })),
        StatusCode::OK,
    )
}

/// Holds the latest view model and serves it to the rendering layer.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SarViewModel::default())),
        }
    }

    /// Starts the HTTP endpoint on its own thread.
    pub fn serve(&self, runner: Arc<Runner>) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("sar")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| {
                let model = state.read().map(|m| m.clone()).unwrap_or_default();
                warp::reply::json(&model)
            });

        let compute_route = warp::path("compute")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(runner_filter.clone())
            .and_then(
                |scenario: ScenarioConfig, state: SharedModel, runner: Arc<Runner>| async move {
                    match run_scenario(runner, scenario, state, None).await {
                        Ok(model) => Ok::<_, warp::Rejection>(ok_reply(&model, None)),
                        Err(err) => {
                            error!("compute error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        let generate_route = warp::path("generate")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: GeneratorConfig, state: SharedModel, runner: Arc<Runner>| async move {
                    let note = config
                        .description
                        .clone()
                        .map(|d| format!("generated scenario: {}", d));
                    let outcome = match build_scenario(&config) {
                        Ok(scenario) => run_scenario(runner, scenario, state, note).await,
                        Err(err) => Err(err),
                    };
                    match outcome {
                        Ok(model) => {
                            println!(
                                "[GUI] Generated scenario seed {} -> area {:.2} nm2",
                                config.seed, model.search_area_nm2
                            );
                            Ok::<_, warp::Rejection>(ok_reply(&model, config.description.clone()))
                        }
                        Err(err) => {
                            error!("generate error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(compute_route).or(generate_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });
    }

    pub fn publish(&self, model: &SarViewModel) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("view model lock poisoned"))?;
        *guard = model.clone();
        println!(
            "[GUI] datum {}, polygon vertices: {}, projections: {}",
            guard
                .datum
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            guard.search_polygon.len(),
            guard.projections.len()
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SarViewModel {
        self.state.read().unwrap().clone()
    }
}

impl Default for GuiBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_scenario_from_seed;

    #[test]
    fn gui_bridge_updates_state() {
        let runner = Runner::new(false);
        let gui = GuiBridge::new();
        let scenario = build_scenario_from_seed(3).unwrap();
        let result = runner.execute(&scenario).unwrap();
        let model = SarViewModel::from_result(&result);
        gui.publish(&model).unwrap();

        let snapshot = gui.snapshot();
        assert_eq!(snapshot.datum, Some(result.outcome.datum()));
        assert_eq!(snapshot.search_polygon.len(), 4);
        assert_eq!(snapshot.effort.len(), 2);
    }

    #[tokio::test]
    async fn scenarios_run_off_the_executor() {
        let state: SharedModel = Arc::new(RwLock::new(SarViewModel::default()));
        let mut scenario = build_scenario_from_seed(5).unwrap();
        scenario.projection.offsets_minutes = vec![30, 60];
        let model = run_scenario(
            Arc::new(Runner::new(true)),
            scenario,
            state.clone(),
            Some("drill".into()),
        )
        .await
        .unwrap();
        assert_eq!(model.projections.len(), 2);
        assert_eq!(model.notes, vec!["drill".to_string()]);
        assert_eq!(state.read().unwrap().projections.len(), 2);
    }
}
