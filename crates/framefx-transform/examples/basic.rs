//! Drive the transform as a host would, over a few synthetic NV12 frames.
//!
//! ```text
//! cargo run -p framefx-transform --example basic -- "brightness:0.2,tint:255,0,0,probe"
//! ```

use std::sync::Arc;

use framefx_format::{ProcessingStage, StreamFormat, Subtype};
use framefx_stages::{FrameProbe, StageRegistry};
use framefx_transform::{
    EffectTransform, MemorySample, OutputDataBuffer, OutputStatus, PropertySet, TransformConfig,
    TransformError, IMAGE_PROVIDERS_KEY,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let list = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "grayscale,negative".to_string());

    let mut chain = StageRegistry::with_builtin().parse_chain(&list)?;
    let probe = Arc::new(FrameProbe::new());
    chain.push(probe.clone() as Arc<dyn ProcessingStage>);
    println!("Chain: {:?}", chain.names());

    let transform = EffectTransform::new(TransformConfig::default())?;
    transform.set_properties(&PropertySet::new().with(IMAGE_PROVIDERS_KEY, chain))?;

    let format = StreamFormat::video(Subtype::SemiPlanar420, WIDTH, HEIGHT);
    transform.set_input_type(0, Some(&format), 0)?;
    transform.set_output_type(0, Some(&format), 0)?;

    let size = usize::try_from(format.image_size()?)?;
    for n in 0..4u8 {
        let frame: Vec<u8> = (0..size)
            .map(|i| u8::try_from(i % 251).unwrap_or_default() ^ n)
            .collect();
        let input = MemorySample::from_bytes(frame)
            .with_time(i64::from(n) * 333_333)
            .with_duration(333_333);
        transform.process_input(0, Arc::new(input), 0)?;

        let output = Arc::new(MemorySample::new(size));
        match transform.process_output(0, &mut [OutputDataBuffer::new(output.clone())])? {
            OutputStatus::Produced => {
                let bytes = output.to_vec();
                println!("Frame {n}: first luma {} first chroma {}", bytes[0], bytes[size * 2 / 3]);
            }
            OutputStatus::NeedMoreInput => return Err(TransformError::NotAccepting.into()),
        }
    }

    let stats = probe.stats();
    println!(
        "Probe saw {} frames, last mean luma {:.1}",
        stats.frames,
        stats.last_mean_luma.unwrap_or_default()
    );
    Ok(())
}
