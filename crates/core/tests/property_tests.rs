//! Property tests: every successful compression decodes back to its input,
//! and decoders reject or bound whatever bytes they are handed.

use bytecodec_core::{
    framing::{compress_and_frame, decompress_frame, parse_frame},
    lz77, rle, Codec, CodecError, CodecKind, Error, HuffmanCodec,
};
use proptest::prelude::*;

/// Byte strings built from runs, so RLE and LZ77 have something to find.
fn runs() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((any::<u8>(), 1usize..300), 1..40).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat(byte).take(len))
            .collect()
    })
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..2048)
}

fn round_trip(codec: &impl Codec, data: &[u8], scratch: usize) -> Result<Vec<u8>, TestCaseError> {
    let mut encoded = vec![0u8; scratch];
    let n = match codec.compress(data, &mut encoded) {
        Ok(n) => n,
        Err(Error::Codec(err)) if err.is_fallback() => return Ok(data.to_vec()),
        Err(err) => return Err(TestCaseError::fail(format!("compress: {err}"))),
    };

    let mut decoded = vec![0u8; data.len()];
    let m = codec
        .decompress(&encoded[..n], &mut decoded)
        .map_err(|err| TestCaseError::fail(format!("decompress: {err}")))?;
    decoded.truncate(m);
    Ok(decoded)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_rle_round_trip(data in prop_oneof![runs(), bytes()]) {
        let decoded = round_trip(&CodecKind::Rle, &data, data.len() * 2)?;
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_rle_never_splits_below_max_run(byte in any::<u8>(), len in 1usize..2000) {
        let data = vec![byte; len];
        let mut encoded = vec![0u8; len * 2];
        let n = rle::compress(&data, &mut encoded).unwrap();

        prop_assert_eq!(n, 2 * len.div_ceil(rle::MAX_RUN));
        for pair in encoded[..n].chunks(2) {
            prop_assert!(pair[0] >= 1);
            prop_assert_eq!(pair[1], byte);
        }
    }

    #[test]
    fn prop_rle_rejects_odd_lengths(data in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(data.len() % 2 == 1);
        let mut out = [0u8; 4096];
        let result = rle::decompress(&data, &mut out);
        let is_malformed = matches!(result, Err(Error::Codec(CodecError::MalformedInput { .. })));
        prop_assert!(is_malformed);
    }

    #[test]
    fn prop_huffman_round_trip(data in prop_oneof![runs(), bytes()]) {
        let codec = HuffmanCodec::new().allow_expansion(true);
        let scratch = data.len() * 2 + 8192;
        let decoded = round_trip(&codec, &data, scratch)?;
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_lz77_round_trip(data in prop_oneof![runs(), bytes()]) {
        let decoded = round_trip(&CodecKind::Lz77, &data, data.len() + 8)?;
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_tagged_lz77_always_succeeds(data in prop_oneof![runs(), bytes()]) {
        let mut encoded = vec![0u8; CodecKind::Lz77Tagged.max_compressed_len(data.len())];
        let n = lz77::tagged::compress(&data, &mut encoded).unwrap();

        let mut decoded = vec![0u8; data.len()];
        let m = lz77::tagged::decompress(&encoded[..n], &mut decoded).unwrap();
        prop_assert_eq!(&decoded[..m], &data[..]);
    }

    #[test]
    fn prop_lz77_decoder_stays_in_bounds(data in bytes(), cap in 1usize..512) {
        // Arbitrary bytes are valid untagged input; output must stay bounded
        let mut out = vec![0u8; cap];
        match lz77::decompress(&data, &mut out) {
            Ok(n) => prop_assert!(n <= cap),
            Err(err) => prop_assert_eq!(err.code(), -2),
        }
    }

    #[test]
    fn prop_decoders_survive_garbage(data in bytes()) {
        let mut out = vec![0u8; 4096];
        for codec in CodecKind::ALL {
            // Errors are fine; panics are not
            let _ = codec.decompress(&data, &mut out);
        }
    }

    #[test]
    fn prop_frame_round_trip(data in prop_oneof![runs(), bytes()], pick in 0usize..5) {
        let codec = CodecKind::ALL[pick];
        let bytes = compress_and_frame(codec, &data).unwrap();
        prop_assert!(bytes.len() <= data.len() + 17);

        let frame = parse_frame(&bytes).unwrap();
        prop_assert_eq!(decompress_frame(&frame).unwrap(), data);
    }
}
