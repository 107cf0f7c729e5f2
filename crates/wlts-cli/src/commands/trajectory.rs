use crate::cli::TrajectoryArgs;
use crate::output::OutputWriter;
use crate::output_types::TrajectoryRow;
use anyhow::Result;
use wlts_core::models::Roles;
use wlts_trajectory::TrajectoryService;

pub async fn execute(
    args: TrajectoryArgs,
    service: &TrajectoryService,
    roles: &Roles,
    output: &OutputWriter,
) -> Result<()> {
    let query = args.into_params().into_query()?;
    let embed_geometry = query.geometry;

    let response = service.get_trajectory(&query, roles).await?;

    // Geometries do not fit in a table
    if output.is_json() || embed_geometry {
        return output.result(response);
    }

    output.section(format!("Trajectory at ({}, {})", query.longitude, query.latitude));
    let rows: Vec<TrajectoryRow> =
        response.result.trajectory.iter().map(TrajectoryRow::from).collect();
    let count = rows.len();
    output.table(rows);
    output.success(format!("{} observations", count));
    Ok(())
}
