use crate::cli::DoctorArgs;
use crate::output::OutputWriter;
use crate::output_types::{CheckResult, DoctorOutput};
use anyhow::{bail, Result};
use console::style;
use wlts_core::models::Roles;
use wlts_trajectory::TrajectoryService;

pub async fn execute(
    args: DoctorArgs,
    service: &TrajectoryService,
    roles: &Roles,
    output: &OutputWriter,
) -> Result<()> {
    output.section("WLTS Health Check");

    let mut checks = Vec::new();
    for collection in service.registry().iter() {
        if !roles.can_see(collection.name(), collection.is_public()) {
            continue;
        }

        let layers = collection.layers();
        let result = collection.verify().await;

        match &result {
            Ok(()) => output.success(format!(
                "{}: {} layer(s) on '{}'",
                collection.name(),
                layers.len(),
                collection.datasource_id()
            )),
            Err(e) => output.failure(format!("{}: {}", collection.name(), e)),
        }
        if args.verbose && !output.is_json() {
            for layer in &layers {
                println!("  {} {}", style("·").dim(), layer);
            }
        }

        checks.push(CheckResult {
            collection: collection.name().to_string(),
            layers: layers.len(),
            passed: result.is_ok(),
            message: result.err().map(|e| e.to_string()).unwrap_or_else(|| "ok".to_string()),
        });
    }

    let total = checks.len();
    let passed = checks.iter().filter(|c| c.passed).count();

    if output.is_json() {
        output.result(DoctorOutput { checks, passed, total })?;
    } else {
        println!();
        println!("{}", style(format!("{}/{} collections passed", passed, total)).bold());
    }

    if passed < total {
        bail!("{} collection(s) failed health checks", total - passed);
    }
    Ok(())
}
