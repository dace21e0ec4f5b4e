//! End-to-end protocol tests driving `EffectTransform` the way a host does

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use framefx_format::{
    ImageView, ImageViewMut, ProcessingChain, ProcessingStage, StageError, StageFuture,
    StreamFormat, Subtype,
};
use framefx_stages::{FrameProbe, Identity, Negative, StageRegistry};
use framefx_transform::{
    classify_error, EffectTransform, ErrorType, MediaBuffer, MediaSample, MemorySample,
    NegotiationState, OutputDataBuffer, OutputStatus, PropertySet, SampleState,
    TransformConfig, TransformError, TransformMessage, IMAGE_PROVIDERS_KEY,
};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn configured(chain: ProcessingChain) -> EffectTransform {
    let transform = EffectTransform::new(TransformConfig::default()).expect("valid config");
    transform
        .set_properties(&PropertySet::new().with(IMAGE_PROVIDERS_KEY, chain))
        .expect("valid chain");
    transform
}

/// Walk the enumeration the way a host does and commit the first offer
fn negotiate(transform: &EffectTransform, subtype: Subtype, width: u32, height: u32) {
    let offered = (0..)
        .map_while(|i| transform.input_available_type(0, i).expect("stream 0"))
        .find(|f| f.subtype == subtype)
        .expect("subtype offered");
    let format = offered.with_frame_size(width, height);

    transform
        .set_input_type(0, Some(&format), 1)
        .expect("test-only accepted");
    transform
        .set_input_type(0, Some(&format), 0)
        .expect("input committed");

    let output = transform
        .output_available_type(0, 0)
        .expect("stream 0")
        .expect("input fixes the output offer");
    assert_eq!(output, format);
    transform
        .set_output_type(0, Some(&output), 0)
        .expect("output committed");
}

fn run_frame(transform: &EffectTransform, input: Vec<u8>) -> Vec<u8> {
    let len = input.len();
    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(input)), 0)
        .expect("input accepted");
    let output = Arc::new(MemorySample::new(len));
    let status = transform
        .process_output(0, &mut [OutputDataBuffer::new(output.clone())])
        .expect("output produced");
    assert_eq!(status, OutputStatus::Produced);
    output.to_vec()
}

#[test]
fn test_full_protocol_identity_round_trip() {
    init_tracing();
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::Packed422, 4, 2);

    let frame: Vec<u8> = (0..16).collect();
    assert_eq!(run_frame(&transform, frame.clone()), frame);

    let info = transform.output_stream_info(0).expect("stream 0");
    assert_eq!(info.sample_size, 16);
}

#[test]
fn test_output_length_and_timestamps() {
    let transform = configured(ProcessingChain::new().with_stage(Negative));
    negotiate(&transform, Subtype::SemiPlanar420, 4, 2);

    let input = MemorySample::from_bytes(vec![0; 12])
        .with_time(10_000_000)
        .with_duration(333_667);
    transform
        .process_input(0, Arc::new(input), 0)
        .expect("input accepted");

    // Output allocation larger than the frame
    let output = Arc::new(MemorySample::new(64));
    transform
        .process_output(0, &mut [OutputDataBuffer::new(output.clone())])
        .expect("produced");

    assert_eq!(output.memory().current_length(), 12);
    assert_eq!(&output.to_vec()[..12], &[255; 12]);
    assert_eq!(output.sample_time(), Some(10_000_000));
    assert_eq!(output.sample_duration(), Some(333_667));
}

#[test]
fn test_strict_alternation_and_flush() {
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::Packed422, 4, 2);

    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![1; 16])), 0)
        .expect("first input");
    let err = transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![2; 16])), 0)
        .expect_err("second input refused");
    assert_eq!(err, TransformError::NotAccepting);
    assert_eq!(classify_error(&err), ErrorType::ProtocolState);

    transform
        .process_message(TransformMessage::CommandFlush)
        .expect("flush");
    assert_eq!(transform.sample_state(), SampleState::Empty);
    assert_eq!(run_frame(&transform, vec![3; 16]), vec![3; 16]);
}

#[test]
fn test_need_more_input_has_no_effect() {
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::Packed422, 4, 2);

    let output = Arc::new(MemorySample::new(16));
    for _ in 0..2 {
        let status = transform
            .process_output(0, &mut [OutputDataBuffer::new(output.clone())])
            .expect("no error");
        assert_eq!(status, OutputStatus::NeedMoreInput);
    }
    assert_eq!(output.memory().current_length(), 0);
    assert_eq!(transform.input_status(0), Ok(true));
}

#[test]
fn test_type_change_refused_while_holding() {
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::Packed422, 4, 2);
    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![0; 16])), 0)
        .expect("input accepted");

    let nv12 = StreamFormat::video(Subtype::SemiPlanar420, 4, 2);
    assert_eq!(
        transform.set_input_type(0, Some(&nv12), 0),
        Err(TransformError::CannotChangeTypeWhileProcessing)
    );

    // Consuming the sample unblocks renegotiation
    let _ = transform.process_output(0, &mut [OutputDataBuffer::new(Arc::new(MemorySample::new(16)))]);
    transform.set_output_type(0, None, 0).expect("clear output");
    transform.set_input_type(0, Some(&nv12), 0).expect("renegotiated");
    assert_eq!(transform.negotiation_state(), NegotiationState::InputOnly);
}

#[test]
fn test_conflicting_commit_leaves_existing_format() {
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::Packed422, 4, 2);

    let wider = StreamFormat::video(Subtype::Packed422, 8, 2);
    let err = transform
        .set_output_type(0, Some(&wider), 0)
        .expect_err("mismatch");
    assert!(matches!(err, TransformError::InvalidMediaType(_)));

    assert_eq!(
        transform.output_current_type(0),
        Ok(StreamFormat::video(Subtype::Packed422, 4, 2))
    );
    assert_eq!(run_frame(&transform, vec![7; 16]), vec![7; 16]);
}

#[test]
fn test_too_small_output_buffer_releases_input() {
    let transform = configured(ProcessingChain::new().with_stage(Identity));
    negotiate(&transform, Subtype::SemiPlanar420, 4, 2);

    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![0; 12])), 0)
        .expect("input accepted");
    let err = transform
        .process_output(0, &mut [OutputDataBuffer::new(Arc::new(MemorySample::new(11)))])
        .expect_err("too small");

    assert_eq!(classify_error(&err), ErrorType::Processing);
    assert_eq!(transform.sample_state(), SampleState::Empty);
}

#[test]
fn test_nv12_grayscale_from_registry() {
    let chain = StageRegistry::with_builtin()
        .parse_chain("grayscale")
        .expect("builtin");
    let transform = configured(chain);
    negotiate(&transform, Subtype::SemiPlanar420, 4, 2);

    let mut frame = vec![50u8; 8];
    frame.extend_from_slice(&[16, 240, 16, 240]);
    let out = run_frame(&transform, frame);

    assert_eq!(&out[..8], &[50; 8]);
    assert_eq!(&out[8..], &[128; 4]);
}

#[test]
fn test_probe_observes_every_frame() {
    let probe = Arc::new(FrameProbe::new());
    let chain = ProcessingChain::from_stages(vec![
        Arc::new(Negative) as Arc<dyn ProcessingStage>,
        probe.clone() as Arc<dyn ProcessingStage>,
    ]);
    let transform = configured(chain);
    negotiate(&transform, Subtype::Packed422, 4, 2);

    for value in [0u8, 100, 200] {
        let out = run_frame(&transform, vec![value; 16]);
        assert_eq!(out, vec![255 - value; 16]);
    }

    let stats = probe.stats();
    assert_eq!(stats.frames, 3);
    // The probe sees the negated frame
    assert_eq!(stats.last_mean_luma, Some(55.0));
}

#[test]
fn test_concurrent_producer_and_consumer() {
    const FRAMES: u8 = 32;

    let transform = Arc::new(configured(ProcessingChain::new().with_stage(Identity)));
    negotiate(&transform, Subtype::Packed422, 4, 2);

    let producer = {
        let transform = Arc::clone(&transform);
        thread::spawn(move || {
            for n in 0..FRAMES {
                loop {
                    let sample = Arc::new(MemorySample::from_bytes(vec![n; 16]));
                    match transform.process_input(0, sample, 0) {
                        Ok(()) => break,
                        Err(TransformError::NotAccepting) => thread::yield_now(),
                        Err(e) => panic!("unexpected input error: {e}"),
                    }
                }
            }
        })
    };

    let consumer = {
        let transform = Arc::clone(&transform);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while seen.len() < usize::from(FRAMES) {
                let output = Arc::new(MemorySample::new(16));
                match transform.process_output(0, &mut [OutputDataBuffer::new(output.clone())]) {
                    Ok(OutputStatus::Produced) => seen.push(output.to_vec()[0]),
                    Ok(OutputStatus::NeedMoreInput) => thread::yield_now(),
                    Err(e) => panic!("unexpected output error: {e}"),
                }
            }
            seen
        })
    };

    producer.join().expect("producer finished");
    let seen = consumer.join().expect("consumer finished");
    assert_eq!(seen, (0..FRAMES).collect::<Vec<_>>());
}

/// Stage that fills its output with a value delivered asynchronously
#[derive(Debug)]
struct AwaitValue {
    rx: Mutex<Option<oneshot::Receiver<u8>>>,
}

impl ProcessingStage for AwaitValue {
    fn name(&self) -> &str {
        "await-value"
    }

    fn render<'a>(
        &'a self,
        _source: &'a ImageView<'_>,
        dest: Option<&'a mut ImageViewMut<'_>>,
    ) -> StageFuture<'a> {
        let rx = self.rx.lock().take();
        async move {
            let rx = rx.ok_or_else(|| StageError::failed("await-value", "value already used"))?;
            let value = rx
                .await
                .map_err(|_| StageError::Cancelled("sender dropped".to_string()))?;
            if let Some(dest) = dest {
                for plane in dest.planes_mut() {
                    plane.data_mut().fill(value);
                }
            }
            Ok::<(), StageError>(())
        }
        .boxed()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_stage_completes_before_output_returns() {
    let (tx, rx) = oneshot::channel();
    let transform = Arc::new(configured(ProcessingChain::new().with_stage(AwaitValue {
        rx: Mutex::new(Some(rx)),
    })));
    negotiate(&transform, Subtype::Packed422, 4, 2);
    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![0; 16])), 0)
        .expect("input accepted");

    let output = Arc::new(MemorySample::new(16));
    let render = {
        let transform = Arc::clone(&transform);
        let output = output.clone();
        tokio::task::spawn_blocking(move || {
            transform.process_output(0, &mut [OutputDataBuffer::new(output)])
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send(42).expect("receiver alive");

    let status = render.await.expect("render task").expect("produced");
    assert_eq!(status, OutputStatus::Produced);
    assert_eq!(output.to_vec(), vec![42; 16]);
}

#[tokio::test]
async fn test_async_stage_failure_surfaces_as_render_error() {
    let (tx, rx) = oneshot::channel::<u8>();
    drop(tx);
    let transform = configured(ProcessingChain::new().with_stage(AwaitValue {
        rx: Mutex::new(Some(rx)),
    }));
    negotiate(&transform, Subtype::Packed422, 4, 2);
    transform
        .process_input(0, Arc::new(MemorySample::from_bytes(vec![0; 16])), 0)
        .expect("input accepted");

    let err = transform
        .process_output(0, &mut [OutputDataBuffer::new(Arc::new(MemorySample::new(16)))])
        .expect_err("stage cancelled");
    assert!(matches!(err, TransformError::Render(_)));
    assert_eq!(transform.sample_state(), SampleState::Empty);
}
