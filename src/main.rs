// Copyright 2020 TwoCookingMice

use lucerna::core::film::Film;
use lucerna::core::settings::RenderSettings;
use lucerna::io::exr_utils;
use lucerna::renderers;
use lucerna::scenes::SimpleScene;

use std::env;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <pt|lt|pm> <output.exr> [--samples N] [--max-vertices N] [--seed N] \
             [--photons N] [--photonmap naive|kdtree] [--finalgather 0|1] [--width N] [--height N]",
            args[0]
        );
        std::process::exit(1);
    }

    let renderer_name = &args[1];
    let output_path = &args[2];
    let mut width: usize = 512;
    let mut height: usize = 512;

    let mut settings = RenderSettings::new();
    settings.set("max_num_vertices", "10");

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("num_samples", v);
                }
            }
            "--max-vertices" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("max_num_vertices", v);
                }
            }
            "--seed" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("seed", v);
                }
            }
            "--photons" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("num_photon_trace_samples", v);
                }
            }
            "--photonmap" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("photonmap", v);
                }
            }
            "--finalgather" => {
                i += 1;
                if let Some(v) = args.get(i) {
                    settings.set("finalgather", v);
                }
            }
            "--width" => {
                i += 1;
                width = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(width);
            }
            "--height" => {
                i += 1;
                height = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(height);
            }
            _ => {}
        }
        i += 1;
    }

    let renderer = match renderers::create(renderer_name, &settings) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("Failed to create renderer {}: {}.", renderer_name, e);
            std::process::exit(1);
        }
    };

    let scene = SimpleScene::cornell_box(width as f32 / height as f32);
    let mut film = Film::new(width, height);
    renderer.render(&scene, &mut film);

    let image = film.develop();
    if let Err(e) = exr_utils::write_exr_to_file(&image, output_path) {
        log::error!("Failed to write {}: {}.", output_path, e);
        std::process::exit(1);
    }
}
