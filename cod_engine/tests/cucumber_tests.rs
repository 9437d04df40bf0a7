mod cucumber;

use ::cucumber::{codegen::LocalBoxFuture, event::ScenarioFinished, gherkin, writer, World};
use futures_util::FutureExt;
use log::*;
use tokio::runtime::Runtime;

use crate::cucumber::CodWorld;

fn main() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let sys = Runtime::new().unwrap();
    sys.block_on(
        CodWorld::cucumber()
            .with_writer(writer::Libtest::or_basic())
            .after(|_f, _r, scenario, ev, w| post_test_hook(scenario, ev, w))
            .run("tests/features"),
    );
    info!("🚀️ Tests complete");
}

fn post_test_hook<'a>(
    scenario: &'a gherkin::Scenario,
    ev: &'a ScenarioFinished,
    world: Option<&'a mut CodWorld>,
) -> LocalBoxFuture<'a, ()> {
    let fut = async move {
        trace!("🚀️ After-scenario hook running for \"{}\"", scenario.name);
        match (ev, world) {
            (ScenarioFinished::StepFailed(_, _, _), Some(world)) => {
                let orders = world.ledger().orders().await;
                error!("🚀️ Scenario \"{}\" failed. Ledger state: {orders:#?}", scenario.name);
            },
            (ScenarioFinished::StepFailed(_, _, _), None) => error!("🚀️ Scenario \"{}\" failed", scenario.name),
            _ => trace!("🚀️ Scenario finished: {ev:?}"),
        }
    };
    fut.boxed_local()
}
