//! Output formatting for decoded reports.

use sigplot_core::AnalysisReport;
use sigplot_core::Site;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
    Markdown,
}

/// Formats a report in the requested output format.
pub fn format_report(report: &AnalysisReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
    }
}

fn report_to_markdown(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let units = report.units();
    let tx = report.transmitter();
    let rx = report.receiver();

    out.push_str("# Analysis Report\n\n");

    out.push_str("## Sites\n\n");
    out.push_str("| | Transmitter | Receiver |\n");
    out.push_str("|---|---|---|\n");
    let site_rows: [(&str, fn(&Site) -> String); 6] = [
        ("Location", |site| {
            format!("{:.4}, {:.4}", site.latitude, site.longitude)
        }),
        ("Ground elevation", |site| {
            format!("{} AMSL", site.units().format(site.elevation, true, false))
        }),
        ("Antenna height", |site| {
            format!("{} AGL", site.units().format(site.height, true, false))
        }),
        ("Distance to remote site", |site| {
            site.units().format(site.distance, true, true)
        }),
        ("Azimuth to remote site", |site| format!("{:.2}°", site.azimuth)),
        ("Downtilt to remote site", |site| format!("{:.4}°", site.downtilt)),
    ];
    for (label, render) in site_rows {
        out.push_str(&format!("| {label} | {} | {} |\n", render(tx), render(rx)));
    }
    out.push('\n');

    let model = report.model();
    out.push_str("## Propagation Model\n\n");
    out.push_str("| Field | Value |\n");
    out.push_str("|-------|-------|\n");
    let model_rows = [
        ("Model", model.model.clone()),
        ("Sub-type", model.subtype.clone()),
        ("Frequency", format!("{} MHz", model.frequency)),
        ("Dielectric constant", model.dielectric_constant.to_string()),
        (
            "Earth conductivity",
            format!("{} S/m", model.earth_conductivity),
        ),
        (
            "Atmospheric bending",
            format!("{} N-units", model.atmospheric_bending),
        ),
        ("Radio climate", model.radio_climate.clone()),
        ("Polarization", model.polarization.clone()),
        (
            "Fraction of situations",
            format!("{:.0}%", model.fraction_of_situations * 100.0),
        ),
        (
            "Fraction of time",
            format!("{:.0}%", model.fraction_of_time * 100.0),
        ),
        ("Receiver gain", format!("{} dBd", model.rx_gain)),
    ];
    for (label, value) in model_rows {
        out.push_str(&format!("| {label} | {value} |\n"));
    }
    out.push('\n');

    let link = report.link();
    out.push_str("## Link Summary\n\n");
    out.push_str("| Field | Value |\n");
    out.push_str("|-------|-------|\n");
    let link_rows = [
        ("Free space path loss", format!("{} dB", link.free_space_path_loss)),
        ("Computed path loss", format!("{} dB", link.computed_path_loss)),
        (
            "Terrain shielding attenuation",
            format!("{} dB", link.terrain_shielding_attenuation),
        ),
        (
            "Field strength at Rx",
            format!("{} dBuV/m", link.field_strength_at_rx),
        ),
        ("Power level at Rx", format!("{} dBm", link.power_level_at_rx)),
        (
            "Power density at Rx",
            format!("{} dBW/m²", link.power_density_at_rx),
        ),
        ("50 ohm dipole voltage", format!("{} uV", link.voltage_50ohm_dipole)),
        ("75 ohm dipole voltage", format!("{} uV", link.voltage_75ohm_dipole)),
        ("Longley-Rice error", link.longley_rice_error.to_string()),
        (
            "Rx raise to clear obstructions",
            units.format(link.rx_adjustment_to_clear_obstructions, true, false),
        ),
        (
            "Rx raise to clear first Fresnel zone",
            units.format(link.rx_adjustment_to_clear_first_fresnel_zone, true, false),
        ),
        (
            "Rx raise to clear 60% of first Fresnel zone",
            units.format(link.rx_adjustment_to_clear_first_fresnel_zone60, true, false),
        ),
    ];
    for (label, value) in link_rows {
        out.push_str(&format!("| {label} | {value} |\n"));
    }
    out.push('\n');

    out.push_str("## Obstructions\n\n");
    if report.obstructions().is_empty() {
        out.push_str("None\n");
        return out;
    }
    out.push_str("| # | Latitude | Longitude | Distance | Height (AMSL) |\n");
    out.push_str("|---|----------|-----------|----------|---------------|\n");
    for (index, obstruction) in report.obstructions().iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            index + 1,
            obstruction.latitude,
            obstruction.longitude,
            units.format(obstruction.distance, true, true),
            units.format(obstruction.height, true, false),
        ));
    }

    out
}
