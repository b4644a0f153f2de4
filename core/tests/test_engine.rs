#[cfg(test)]
mod tests {
    use shardcrypt_core::constants::BLOCK_SIZE;
    use shardcrypt_core::crypto::{transform_block, CipherAdapter, CipherMode, Direction};
    use shardcrypt_core::protocol::engine::{
        check_share, plan_split, transform_blocks_parallel, EngineError, SplitPlan, TransformEngine,
    };
    use shardcrypt_core::protocol::ParallelismProfile;
    use shardcrypt_core::telemetry::TelemetryCounters;

    const KEY: [u8; 16] = [0x2b; 16];

    fn engine(mode: CipherMode, direction: Direction, units: usize, rank: usize, last: bool) -> TransformEngine {
        TransformEngine::new(
            CipherAdapter::new(&KEY).unwrap(),
            direction,
            mode,
            ParallelismProfile::fixed(units),
            rank,
            last,
        )
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    fn ecb_blocks(data: &[u8]) -> Vec<u8> {
        data.chunks_exact(BLOCK_SIZE)
            .flat_map(|b| transform_block(b.try_into().unwrap(), &KEY, Direction::Encrypt).unwrap())
            .collect()
    }

    #[test]
    fn share_must_be_whole_blocks_with_several_workers() {
        // single worker: any length goes
        assert_eq!(check_share(1000, 1), Ok(()));
        // 192 / 4 = 48, and fewer bytes than workers gives empty shares
        assert_eq!(check_share(192, 4), Ok(()));
        assert_eq!(check_share(3, 8), Ok(()));
        assert_eq!(check_share(0, 5), Ok(()));

        assert_eq!(
            check_share(1000, 4),
            Err(EngineError::UnalignedShare { total: 1000, workers: 4, share: 250 })
        );
        assert_eq!(
            check_share(40, 4),
            Err(EngineError::UnalignedShare { total: 40, workers: 4, share: 10 })
        );
    }

    #[test]
    fn split_plan_forward() {
        assert_eq!(
            plan_split(48, Direction::Encrypt, false),
            SplitPlan { parallel_len: 48, padded_final: false }
        );
        assert_eq!(
            plan_split(48, Direction::Encrypt, true),
            SplitPlan { parallel_len: 48, padded_final: true }
        );
        assert_eq!(
            plan_split(40, Direction::Encrypt, false),
            SplitPlan { parallel_len: 32, padded_final: true }
        );
    }

    #[test]
    fn split_plan_inverse() {
        assert_eq!(
            plan_split(64, Direction::Decrypt, true),
            SplitPlan { parallel_len: 48, padded_final: true }
        );
        assert_eq!(
            plan_split(64, Direction::Decrypt, false),
            SplitPlan { parallel_len: 64, padded_final: false }
        );
        assert_eq!(
            plan_split(40, Direction::Decrypt, false),
            SplitPlan { parallel_len: 32, padded_final: true }
        );
    }

    #[test]
    fn zero_tail_on_inner_rank_adds_no_padding() {
        let data = pattern(48);
        let mut counters = TelemetryCounters::default();
        let out = engine(CipherMode::BlockIndependent, Direction::Encrypt, 2, 1, false)
            .transform(&data, &mut counters)
            .unwrap();

        assert_eq!(out.bytes, ecb_blocks(&data));
        assert_eq!(out.blocks_parallel, 3);
        assert_eq!(out.tail_len, 0);
        assert_eq!(counters.bytes_padding, 0);
    }

    #[test]
    fn zero_tail_on_last_rank_appends_padding_block() {
        let data = pattern(48);
        let mut counters = TelemetryCounters::default();
        let out = engine(CipherMode::BlockIndependent, Direction::Encrypt, 2, 3, true)
            .transform(&data, &mut counters)
            .unwrap();

        assert_eq!(out.len(), 64);
        assert_eq!(&out.bytes[..48], &ecb_blocks(&data)[..]);
        let pad = transform_block(&[BLOCK_SIZE as u8; BLOCK_SIZE], &KEY, Direction::Encrypt).unwrap();
        assert_eq!(&out.bytes[48..], &pad);
        assert_eq!(counters.bytes_padding, 16);
    }

    #[test]
    fn partial_tail_is_padded_to_a_block() {
        let data = pattern(40);
        let mut counters = TelemetryCounters::default();
        let out = engine(CipherMode::BlockIndependent, Direction::Encrypt, 4, 0, false)
            .transform(&data, &mut counters)
            .unwrap();

        assert_eq!(out.len(), 48);
        assert_eq!(&out.bytes[..32], &ecb_blocks(&data[..32])[..]);
        assert_eq!(out.blocks_parallel, 2);
        assert_eq!(out.tail_len, 8);
        assert_eq!(counters.bytes_in, 40);
        assert_eq!(counters.bytes_out, 48);
    }

    #[test]
    fn execution_unit_count_does_not_change_output() {
        let data = pattern(16 * 257 + 5);
        let baseline = engine(CipherMode::BlockIndependent, Direction::Encrypt, 1, 0, true)
            .transform(&data, &mut TelemetryCounters::default())
            .unwrap();

        for units in [2usize, 3, 4, 7, 64, 1000] {
            let out = engine(CipherMode::BlockIndependent, Direction::Encrypt, units, 0, true)
                .transform(&data, &mut TelemetryCounters::default())
                .unwrap();
            assert_eq!(out.bytes, baseline.bytes, "units {units}");
        }
    }

    #[test]
    fn parallel_blocks_report_bytes_written() {
        let adapter = CipherAdapter::new(&KEY).unwrap();
        let data = pattern(16 * 10);
        let mut out = vec![0u8; data.len()];

        let written = transform_blocks_parallel(&adapter, &data, &mut out, Direction::Encrypt, 3);
        assert_eq!(written, data.len());
        assert_eq!(out, ecb_blocks(&data));

        assert_eq!(transform_blocks_parallel(&adapter, &[], &mut [], Direction::Encrypt, 3), 0);
    }

    #[test]
    fn independent_round_trip_on_last_rank() {
        for len in [1usize, 15, 16, 17, 48, 1000] {
            let data = pattern(len);
            let ct = engine(CipherMode::BlockIndependent, Direction::Encrypt, 3, 0, true)
                .transform(&data, &mut TelemetryCounters::default())
                .unwrap();
            let pt = engine(CipherMode::BlockIndependent, Direction::Decrypt, 3, 0, true)
                .transform(&ct.bytes, &mut TelemetryCounters::default())
                .unwrap();
            assert_eq!(pt.bytes, data, "len {len}");
        }
    }

    #[test]
    fn aligned_inner_rank_round_trip() {
        let data = pattern(64);
        let ct = engine(CipherMode::BlockIndependent, Direction::Encrypt, 2, 1, false)
            .transform(&data, &mut TelemetryCounters::default())
            .unwrap();
        let pt = engine(CipherMode::BlockIndependent, Direction::Decrypt, 2, 1, false)
            .transform(&ct.bytes, &mut TelemetryCounters::default())
            .unwrap();
        assert_eq!(pt.bytes, data);
    }

    #[test]
    fn unaligned_inverse_chunk_is_padding_error() {
        let err = engine(CipherMode::BlockIndependent, Direction::Decrypt, 2, 2, false)
            .transform(&pattern(40), &mut TelemetryCounters::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Padding { rank: 2, input_len: 40, .. }), "{err:?}");
    }

    #[test]
    fn inverse_that_yields_nothing_is_padding_error() {
        // one block holding nothing but padding
        let ct = transform_block(&[BLOCK_SIZE as u8; BLOCK_SIZE], &KEY, Direction::Encrypt).unwrap();
        let err = engine(CipherMode::BlockIndependent, Direction::Decrypt, 1, 0, true)
            .transform(&ct, &mut TelemetryCounters::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Padding { .. }), "{err:?}");
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        for mode in [CipherMode::Chained, CipherMode::BlockIndependent] {
            for direction in [Direction::Encrypt, Direction::Decrypt] {
                let mut counters = TelemetryCounters::default();
                let out = engine(mode, direction, 4, 0, true).transform(&[], &mut counters).unwrap();
                assert!(out.is_empty(), "{mode} {direction}");
                assert_eq!(counters.bytes_out, 0);
            }
        }
    }

    #[test]
    fn chained_round_trip_and_padding() {
        let data = pattern(32);
        let ct = engine(CipherMode::Chained, Direction::Encrypt, 4, 0, true)
            .transform(&data, &mut TelemetryCounters::default())
            .unwrap();
        assert_eq!(ct.len(), 48, "aligned chunk gains a full padding block");
        assert_eq!(ct.blocks_parallel, 0);

        let pt = engine(CipherMode::Chained, Direction::Decrypt, 4, 0, true)
            .transform(&ct.bytes, &mut TelemetryCounters::default())
            .unwrap();
        assert_eq!(pt.bytes, data);
    }

    #[test]
    fn chained_inverse_of_garbage_length_is_padding_error() {
        let err = engine(CipherMode::Chained, Direction::Decrypt, 1, 1, true)
            .transform(&pattern(20), &mut TelemetryCounters::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Padding { rank: 1, input_len: 20, .. }), "{err:?}");
    }
}
