// Pooling tests — pooled extent, overlap correction and backward checks

use vole::infer::pooled_dim;
use vole::prelude::*;

fn batch(engine: &RefEngine, s: (usize, usize, usize, usize)) -> ImageBatch<RefTensor> {
    ImageBatch::new(engine.zeros(Scale::from(s)).unwrap()).unwrap()
}

fn max_pool(window: usize, stride: usize) -> PoolingInfo {
    PoolingInfo::new(PoolingAlgorithm::Max, [window, window], [stride, stride])
}

#[test]
fn test_pooled_dim_even_split() {
    assert_eq!(pooled_dim(4, 0, 2, 2).unwrap(), 2);
}

#[test]
fn test_pooled_dim_ceil_without_correction() {
    // raw = (4 - 3 + 1) / 2 + 1 = 2; (2 - 1) * 2 - 4 < 0 keeps it.
    assert_eq!(pooled_dim(4, 0, 3, 2).unwrap(), 2);
}

#[test]
fn test_pooled_dim_correction_drops_window_in_padding() {
    // raw = (1 + 2 - 1 + 1) / 2 + 1 = 2; (2 - 1) * 2 - 1 - 1 = 0 drops one.
    assert_eq!(pooled_dim(1, 1, 1, 2).unwrap(), 1);
}

#[test]
fn test_pooled_dim_rejects_bad_parameters() {
    assert!(matches!(pooled_dim(4, 0, 2, 0), Err(Error::InvalidParameter(_))));
    assert!(matches!(pooled_dim(4, 0, 0, 1), Err(Error::InvalidParameter(_))));
    assert!(matches!(pooled_dim(2, 0, 3, 1), Err(Error::InvalidParameter(_))));
}

#[test]
fn test_pooling_forward_shape() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let src = batch(&engine, (6, 4, 3, 2));
    let info = PoolingInfo::new(PoolingAlgorithm::Average, [3, 2], [2, 2]);

    let top = conv.pooling_forward(&src, info).unwrap();
    // width: window 2 -> (6 - 2 + 1) / 2 + 1 = 3; height: window 3 -> 2
    assert_eq!(top.shape(), &Scale::from((3, 2, 3, 2)));
    assert_eq!(engine.wait(top.handle()).unwrap(), Completion::Tensor);
}

#[test]
fn test_pooling_forward_with_padding() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let src = batch(&engine, (5, 5, 1, 1));
    let info = max_pool(3, 2).with_padding(1, 1);

    let top = conv.pooling_forward(&src, info).unwrap();
    // raw = (5 + 2 - 3 + 1) / 2 + 1 = 3; (3 - 1) * 2 - 5 - 1 < 0 keeps it.
    assert_eq!(top.width(), 3);
    assert_eq!(top.height(), 3);
}

#[test]
fn test_pooling_backward_accepts_forward_output() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 1));
    let info = max_pool(2, 2);

    let top = conv.pooling_forward(&bottom, info).unwrap();
    let grad = conv.pooling_backward(&top, &top, &bottom, info).unwrap();
    assert_eq!(grad.shape(), bottom.shape());
    assert_eq!(engine.wait(grad.handle()).unwrap(), Completion::Tensor);
}

#[test]
fn test_pooling_backward_rejects_wrong_width_even_when_diff_matches_top() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 1));
    let top = batch(&engine, (3, 2, 3, 1));

    let err = conv
        .pooling_backward(&top, &top, &bottom, max_pool(2, 2))
        .unwrap_err();
    assert_eq!(
        err,
        Error::ShapeMismatch {
            context: "width mismatch",
            expected: Scale::from(2),
            got: Scale::from(3),
        }
    );
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn test_pooling_backward_checks_height_before_width() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 1));
    let top = batch(&engine, (3, 3, 3, 1));

    let err = conv
        .pooling_backward(&top, &top, &bottom, max_pool(2, 2))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            context: "height mismatch",
            ..
        }
    ));
}

#[test]
fn test_pooling_backward_diff_top_mismatch() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 1));
    let top = batch(&engine, (2, 2, 3, 1));
    let diff = batch(&engine, (2, 2, 3, 2));

    let err = conv
        .pooling_backward(&diff, &top, &bottom, max_pool(2, 2))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            context: "inputs sizes mismatch",
            ..
        }
    ));
}

#[test]
fn test_pooling_backward_image_count_mismatch() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 2));
    let top = batch(&engine, (2, 2, 3, 1));

    let err = conv
        .pooling_backward(&top, &top, &bottom, max_pool(2, 2))
        .unwrap_err();
    assert_eq!(
        err,
        Error::BatchMismatch {
            context: "#images mismatch",
            expected: 2,
            got: 1,
        }
    );
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn test_pooling_backward_channel_mismatch() {
    let engine = RefEngine::default();
    let conv = Convolution::new(&engine);
    let bottom = batch(&engine, (4, 4, 3, 1));
    let top = batch(&engine, (2, 2, 4, 1));

    let err = conv
        .pooling_backward(&top, &top, &bottom, max_pool(2, 2))
        .unwrap_err();
    assert_eq!(
        err,
        Error::ChannelMismatch {
            context: "#channels mismatch",
            expected: 3,
            got: 4,
        }
    );
}
