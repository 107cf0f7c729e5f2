use crate::cli::DescribeArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use wlts_core::models::Roles;
use wlts_trajectory::TrajectoryService;

pub fn execute(
    args: DescribeArgs,
    service: &TrajectoryService,
    roles: &Roles,
    output: &OutputWriter,
) -> Result<()> {
    let description = service.describe_collection(&args.name, roles)?;

    if output.is_json() {
        return output.result(description);
    }

    output.section(&description.title);
    output.kv("Name", &description.name);
    output.kv("Type", description.collection_type);
    if !description.description.is_empty() {
        output.kv("Description", &description.description);
    }
    output.kv(
        "Period",
        format!("{} to {}", description.period.start_date, description.period.end_date),
    );
    output.kv(
        "Resolution",
        format!("{} {}", description.resolution_unit.value, description.resolution_unit.unit),
    );
    let extent = description.spatial_extent;
    output.kv(
        "Extent",
        format!("[{}, {}, {}, {}]", extent.xmin, extent.ymin, extent.xmax, extent.ymax),
    );
    output.kv("Classification", &description.classification_system.kind);
    output.kv("Public", description.is_public);
    if description.deprecated {
        output.info("This collection is deprecated");
    }
    Ok(())
}
