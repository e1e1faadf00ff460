//! `bigiron-virt list` command

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MachineRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATE")]
    state: String,
}

/// List machines and their libvirt states.
pub fn list() -> Result<()> {
    let machines = bigiron_core::api::list_machines()?;

    if machines.is_empty() {
        println!("No machines");
        return Ok(());
    }

    let rows: Vec<MachineRow> = machines
        .into_iter()
        .map(|m| MachineRow { name: m.name, state: m.state.to_string() })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::blank());

    println!("{}", table);

    Ok(())
}
