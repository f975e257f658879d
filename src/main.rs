use anyhow::{Context, bail};
use tracing::{info, warn};

use omestack_rs::logger;
use omestack_rs::stack_core::{ImageStack, SaveConfig, TiffCompression};

/// Inspect a TIFF/OME-TIFF stack, optionally reinterpret its planes as
/// interleaved channels and re-export it in canonical plane order.
///
/// Usage: omestack_rs <input.tif> [interleaved-channels] [output.ome.tif]
fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first() else {
        bail!("usage: omestack_rs <input.tif> [interleaved-channels] [output.ome.tif]");
    };

    let mut stack = ImageStack::open_tiff(input).context("failed to open input")?;

    let dims = stack.effective_dims();
    info!(
        input = %input,
        size_x = dims.size_x,
        size_y = dims.size_y,
        size_z = dims.size_z,
        size_c = dims.size_c,
        size_t = dims.size_t,
        image_count = dims.image_count,
        pixel_type = %stack.pixel_type(),
        ome = stack.is_self_describing(),
        "Opened stack"
    );

    if let Some(channels) = args.get(1) {
        let channels: usize = channels.parse().context("invalid channel count")?;
        stack
            .set_interleaved_channel_count(channels)
            .context("failed to reinterpret planes")?;
        let dims = stack.effective_dims();
        info!(
            channels,
            size_z = dims.size_z,
            size_c = dims.size_c,
            "Applied interleaving interpretation"
        );
    }

    // Pull the middle plane through the display path as a smoke check.
    let dims = stack.effective_dims();
    let image = stack.read_plane(dims.size_z / 2, 0, 0);
    if image.is_empty() {
        warn!("Middle plane could not be displayed");
    } else {
        info!(
            width = image.width,
            height = image.height,
            bytes_per_channel = image.bytes_per_channel,
            "Normalized middle plane"
        );
    }

    if let Some(output) = args.get(2) {
        let metadata = stack.extract_metadata();
        let config = SaveConfig::builder()
            .compression(TiffCompression::DeflateBalanced)
            .build();

        // Write to a temporary path and rename over the destination only
        // after full success, so a cancelled or failed save never leaves
        // a truncated file in place.
        let tmp_path = format!("{output}.part");
        let mut progress = |written: usize, total: usize| {
            info!("Written {written} of {total} planes");
            true
        };
        match stack.save_to_path(&tmp_path, &metadata, &config, Some(&mut progress)) {
            Ok(()) => {
                std::fs::rename(&tmp_path, output).context("failed to move export in place")?;
                info!(output = %output, "Export complete");
            }
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(e).context("export failed");
            }
        }
    }

    Ok(())
}
