use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use image::{ImageBuffer, Rgba};

use comic_thumbs::guid::{IID_ICLASS_FACTORY, IID_ITHUMBNAIL_PROVIDER};
use comic_thumbs::hresult::HResult;
use comic_thumbs::module::{get_class_object, ModuleHandle};
use comic_thumbs::source::MemorySource;
use comic_thumbs::surface::AlphaType;
use comic_thumbs::CLSID_COMIC_THUMB_PROVIDER;

/// A command line tool for generating thumbnails for comic archives.
///
/// Drives the same object lifecycle the shell goes through: class
/// object, factory, instance, bind, render.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The output image file
    output: PathBuf,

    /// The comic archive for which you want to generate a thumbnail
    #[clap(short, long)]
    input: PathBuf,

    /// Square thumbnail size in pixels
    #[clap(short, long, default_value_t = 256)]
    size: u32,
}

fn expect_ok(hr: HResult, what: &str) {
    if hr.is_err() {
        eprintln!("{what} failed: {hr}");
        process::exit(2);
    }
}

fn main() {
    let args = Args::parse();

    let bytes = match fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", args.input.display());
            process::exit(1);
        }
    };

    let module = ModuleHandle::new();

    let mut factory_slot = None;
    expect_ok(
        get_class_object(
            &module,
            &CLSID_COMIC_THUMB_PROVIDER,
            &IID_ICLASS_FACTORY,
            Some(&mut factory_slot),
        ),
        "class object lookup",
    );
    let factory = factory_slot.unwrap();

    let mut provider_slot = None;
    expect_ok(
        factory.create_instance(None, &IID_ITHUMBNAIL_PROVIDER, Some(&mut provider_slot)),
        "instance creation",
    );
    let provider = provider_slot.unwrap();

    let source = MemorySource::new(bytes);
    expect_ok(provider.initialize(Some(&source), 0), "source bind");

    let mut bitmap = None;
    let mut alpha = AlphaType::Unknown;
    expect_ok(
        provider.get_thumbnail(args.size, Some(&mut bitmap), Some(&mut alpha)),
        "thumbnail render",
    );
    let bitmap = bitmap.unwrap();

    // BGRA to RGBA for the image crate.
    let mut pixels = bitmap.into_pixels();
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }

    let image = ImageBuffer::<Rgba<u8>, _>::from_raw(args.size, args.size, pixels).unwrap();
    if let Err(err) = image.save(&args.output) {
        eprintln!("Failed to write {}: {err}", args.output.display());
        process::exit(3);
    }
}
