use std::env;
use std::fs::{self, create_dir_all, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use log::{error, info};
use structured_logger::json::new_writer;
use structured_logger::Builder;
use xz::bufread::XzDecoder;

use osm_canvas::config::{load_user_config, UserConfig};
use osm_canvas::errors::{Error, ErrorKind, Result};
use osm_canvas::etl::draw_map::DrawMapEtl;
use osm_canvas::etl::Etl;
use osm_canvas::{MapLoader, MapPipeline, ViewportController};

const DEFAULT_CONFIG_PATH: &str = "config/map.json";

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn read_extract(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut text = String::new();
    if path.extension().is_some_and(|ext| ext == "xz") {
        XzDecoder::new(BufReader::new(file)).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    Ok(text)
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or_else(|| Error::new(ErrorKind::Config, "data_path has no file name"))?;
    let output_dir = Path::new(&config.dest_path).join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    let (canvas_width, canvas_height) = user_config.canvas_size();

    let mut pipeline = MapPipeline::new(canvas_width, canvas_height);
    let mut loader = MapLoader::new();
    match read_extract(Path::new(&user_config.data_path)) {
        Ok(text) => {
            loader.load(&mut pipeline, &text);
        },
        Err(err) => {
            error!(data_path = user_config.data_path.as_str(), err = err.message.as_str(); "Could not read extract");
            let ticket = loader.begin_load();
            loader.complete(ticket, Err(err));
        },
    }
    let map = loader.current();

    let output_dir = create_output_dir(&user_config)?;
    fs::write(
        output_dir.join("render_paths.json"),
        serde_json::to_vec(&map.paths)?,
    )?;

    let mut draw_canvas = DrawMapEtl::for_canvas(
        user_config.canvas_width,
        user_config.canvas_height,
        user_config.background_color,
    )?;
    let canvas = draw_canvas.process(map.paths.as_slice())?;
    draw_canvas.write_png(&canvas, output_dir.join("canvas.png"))?;

    let controller = ViewportController::new(user_config.viewport_config());
    let view = controller.state();
    let mut draw_view = DrawMapEtl::for_viewport(controller.display_size(), view, user_config.background_color)?;
    let viewport = draw_view.process(map.paths.as_slice())?;
    draw_view.write_png(&viewport, output_dir.join("viewport.png"))?;

    info!(
        output_dir = output_dir.display().to_string().as_str(),
        paths = map.paths.len(),
        transform = view.css_transform().as_str();
        "Wrote map"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_needs_an_input_file_name() {
        let config = UserConfig::from_json(r#"{"data_path": "..", "dest_path": "out"}"#).unwrap();
        let err = create_output_dir(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }
}
