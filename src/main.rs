use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use panel_cutlist::config::{DEFAULT_MAX_SHEETS, PackingConfig};
use panel_cutlist::types::PanelRequest;
use panel_cutlist::{PackingResult, dxf, ingest, render, solver};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "panel_cutlist",
    about = "Packs rectangular panels onto stock sheets (no rotation)"
)]
struct Cli {
    /// Sheet dimensions in mm (WxH, e.g. 2440x1220 or 2440x1220.5)
    #[arg(long, default_value = "2440x1220")]
    sheet: String,

    /// Maximum number of sheets the run may open
    #[arg(long, default_value_t = DEFAULT_MAX_SHEETS)]
    max_sheets: usize,

    /// Blade kerf width in mm (default: 0)
    #[arg(long, default_value_t = 0.0)]
    kerf: f64,

    /// CSV cut list with PanelID, Width_mm, Height_mm, Quantity columns
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Panels as ID:WxH:qty (e.g. P1:600x400:4 P2:800x300:2)
    #[arg(long = "panel", num_args = 1..)]
    panels: Vec<String>,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Write one DXF file per sheet into this directory
    #[arg(long)]
    dxf_dir: Option<PathBuf>,

    /// Print the full result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn parse_dimensions(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    Ok((width, height))
}

fn parse_panel(s: &str) -> Result<PanelRequest, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("invalid panel '{}', expected ID:WxH:qty", s));
    }
    let (width, height) = parse_dimensions(parts[1])?;
    let quantity = parts[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    // Non-positive sizes and zero quantities are left for the packer to reject
    Ok(PanelRequest::new(parts[0], width, height, quantity))
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn write_dxf(dir: &Path, result: &PackingResult) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for sheet in &result.sheets {
        let path = dir.join(format!("sheet_{}.dxf", sheet.index + 1));
        std::fs::write(
            &path,
            dxf::sheet_to_dxf(sheet.width, sheet.height, &sheet.placements),
        )?;
        tracing::info!(path = %path.display(), "wrote dxf");
    }
    Ok(())
}

fn print_text(result: &PackingResult, layout: bool) {
    for sheet in &result.sheets {
        println!("Sheet {}:", sheet.index + 1);
        for p in &sheet.placements {
            println!("  {} {}", p.panel_id, p.rect);
        }
        if layout {
            print!(
                "{}",
                render::render_sheet(sheet.width, sheet.height, &sheet.placements)
            );
        }
        println!();
    }

    let u = &result.utilization;
    println!(
        "Summary: {} sheet{} used, {:.1}% utilization, {:.0} mm² waste ({:.1}%)",
        u.sheets_used,
        if u.sheets_used == 1 { "" } else { "s" },
        u.utilization_ratio() * 100.0,
        u.waste_area,
        result.total_waste_percent(),
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(cli.log_level)
        .init();

    let (sheet_width, sheet_height) = parse_dimensions(&cli.sheet).unwrap_or_else(|e| fail(e));

    let mut requests: Vec<PanelRequest> = Vec::new();
    if let Some(path) = &cli.csv {
        let file = File::open(path)
            .unwrap_or_else(|e| fail(format!("cannot open {}: {}", path.display(), e)));
        requests.extend(ingest::read_csv(file).unwrap_or_else(|e| fail(e)));
    }
    for arg in &cli.panels {
        requests.push(parse_panel(arg).unwrap_or_else(|e| fail(e)));
    }
    if requests.is_empty() {
        fail("no panels given, use --csv or --panel");
    }

    let config = PackingConfig::new(sheet_width, sheet_height, cli.max_sheets).with_kerf(cli.kerf);
    let result = solver::pack(config, requests).unwrap_or_else(|e| fail(e));

    if let Some(dir) = &cli.dxf_dir {
        write_dxf(dir, &result).unwrap_or_else(|e| fail(e));
    }

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        print_text(&result, cli.layout);
    }
}
