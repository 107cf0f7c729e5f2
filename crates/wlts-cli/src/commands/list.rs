use crate::output::OutputWriter;
use crate::output_types::{CollectionRow, ListOutput};
use anyhow::Result;
use wlts_core::models::Roles;
use wlts_trajectory::TrajectoryService;

pub fn execute(service: &TrajectoryService, roles: &Roles, output: &OutputWriter) -> Result<()> {
    let names = service.list_collections(roles);

    if output.is_json() {
        return output.result(ListOutput { collections: names });
    }

    let rows: Vec<CollectionRow> = names
        .iter()
        .filter_map(|name| service.registry().get(name))
        .map(|collection| CollectionRow::from(collection.as_ref()))
        .collect();

    output.section("Collections");
    output.table(rows);
    Ok(())
}
