/* Copyright 2020 @Yuchen Wong */

use crate::math::bitmap::Bitmap;

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(image: &Bitmap, file_path: &str) -> std::result::Result<(), Error> {
    log::info!("Starting writing openexr image: {}.", file_path);

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let pixel = &image[(x, y)];
        (pixel[0], pixel[1], pixel[2])
    })?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
