#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use proptest::prelude::*;
    use shardcrypt_core::partition::{partition, range_for, scatter, PartitionError, Range};

    fn assert_covers(ranges: &[Range], total: usize, workers: usize) {
        assert_eq!(ranges.len(), workers);
        let mut cursor = 0;
        for (i, r) in ranges.iter().enumerate() {
            assert_eq!(r.rank, i, "ranges must be ordered by rank");
            assert_eq!(r.offset, cursor, "gap or overlap before rank {i}");
            cursor = r.end();
        }
        assert_eq!(cursor, total, "lengths must sum to the total");
    }

    #[test]
    fn forty_bytes_over_four_workers() {
        let ranges = partition(40, 4).unwrap();
        let got: Vec<(usize, usize)> = ranges.iter().map(|r| (r.offset, r.len)).collect();
        assert_eq!(got, vec![(0, 10), (10, 10), (20, 10), (30, 10)]);
    }

    #[test]
    fn remainder_goes_to_last_rank() {
        let ranges = partition(43, 4).unwrap();
        assert_eq!(ranges[3], Range { rank: 3, offset: 30, len: 13 });
        assert!(ranges[..3].iter().all(|r| r.len == 10));
    }

    #[test]
    fn more_workers_than_bytes() {
        let ranges = partition(3, 5).unwrap();
        assert_covers(&ranges, 3, 5);
        assert!(ranges[..4].iter().all(Range::is_empty));
        assert_eq!(ranges[4].len, 3);
    }

    #[test]
    fn empty_input_gives_empty_ranges() {
        let ranges = partition(0, 3).unwrap();
        assert_covers(&ranges, 0, 3);
        assert!(ranges.iter().all(Range::is_empty));
    }

    #[test]
    fn zero_workers_rejected() {
        assert_eq!(partition(10, 0), Err(PartitionError::NoWorkers));
        assert_eq!(range_for(0, 10, 0), Err(PartitionError::NoWorkers));
    }

    #[test]
    fn rank_out_of_range_rejected() {
        assert_eq!(
            range_for(4, 10, 4),
            Err(PartitionError::RankOutOfRange { rank: 4, workers: 4 })
        );
    }

    #[test]
    fn scatter_slices_in_rank_order() {
        let buf = Bytes::from((0u8..40).collect::<Vec<_>>());
        let ranges = partition(buf.len(), 4).unwrap();
        let chunks = scatter(&buf, &ranges).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(&chunks[1][..], &(10u8..20).collect::<Vec<_>>()[..]);
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        assert_eq!(joined, buf.to_vec());
    }

    #[test]
    fn scatter_rejects_ranges_past_the_buffer() {
        let buf = Bytes::from_static(b"short");
        let ranges = partition(8, 2).unwrap();
        assert!(matches!(
            scatter(&buf, &ranges),
            Err(PartitionError::OutOfBounds { len: 5, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_partition_covers_total(total in 0usize..100_000, workers in 1usize..64) {
            let ranges = partition(total, workers).unwrap();
            prop_assert_eq!(ranges.len(), workers);

            let mut cursor = 0;
            for (i, r) in ranges.iter().enumerate() {
                prop_assert_eq!(r.rank, i);
                prop_assert_eq!(r.offset, cursor);
                cursor = r.end();
            }
            prop_assert_eq!(cursor, total);
        }

        #[test]
        fn prop_partition_deterministic(total in 0usize..100_000, workers in 1usize..64) {
            prop_assert_eq!(partition(total, workers).unwrap(), partition(total, workers).unwrap());
        }

        #[test]
        fn prop_range_for_matches_partition(total in 0usize..10_000, workers in 1usize..32) {
            let ranges = partition(total, workers).unwrap();
            for rank in 0..workers {
                prop_assert_eq!(range_for(rank, total, workers).unwrap(), ranges[rank]);
            }
        }
    }
}
