#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use bytes::Bytes;
    use shardcrypt_core::transport::{Communicator, LocalWorld, Message, Tag, TransportError};

    #[test]
    fn world_size_is_validated() {
        assert!(matches!(LocalWorld::create(0), Err(TransportError::InvalidWorld(_))));
        assert!(matches!(LocalWorld::create(10_000), Err(TransportError::InvalidWorld(_))));

        let world = LocalWorld::create(3).unwrap();
        let ranks: Vec<usize> = world.iter().map(|e| e.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
        assert!(world.iter().all(|e| e.size() == 3));
        assert!(world[0].is_coordinator());
        assert!(!world[2].is_coordinator());
    }

    #[test]
    fn per_pair_delivery_is_fifo() {
        let world = LocalWorld::create(2).unwrap();
        for i in 0..10u64 {
            world[1].send(0, Message::ChunkLength(i)).unwrap();
        }
        for i in 0..10u64 {
            let got = world[0].recv(1, Tag::ChunkLength).unwrap().into_length(1).unwrap();
            assert_eq!(got, i);
        }
    }

    #[test]
    fn receive_is_keyed_by_source() {
        let world = LocalWorld::create(3).unwrap();
        world[2].send(0, Message::Transformed(Bytes::from_static(b"two"))).unwrap();
        world[1].send(0, Message::Transformed(Bytes::from_static(b"one"))).unwrap();

        let one = world[0].recv(1, Tag::Transformed).unwrap().into_bytes(1).unwrap();
        let two = world[0].recv(2, Tag::Transformed).unwrap().into_bytes(2).unwrap();
        assert_eq!(&one[..], b"one");
        assert_eq!(&two[..], b"two");
    }

    #[test]
    fn tag_mismatch_is_an_error() {
        let world = LocalWorld::create(2).unwrap();
        world[0].send(1, Message::TotalLength(5)).unwrap();

        let err = world[1].recv(0, Tag::Chunk).unwrap_err();
        assert_eq!(
            err,
            TransportError::UnexpectedMessage { from: 0, expected: Tag::Chunk, got: Tag::TotalLength }
        );
    }

    #[test]
    fn invalid_rank_is_rejected() {
        let world = LocalWorld::create(2).unwrap();
        assert_eq!(
            world[0].send(2, Message::BarrierArrive),
            Err(TransportError::InvalidRank { rank: 2, size: 2 })
        );
        assert!(matches!(world[0].recv(7, Tag::Chunk), Err(TransportError::InvalidRank { .. })));
    }

    #[test]
    fn broadcast_total_reaches_every_rank() {
        let world = LocalWorld::create(4).unwrap();
        let totals: Vec<u64> = thread::scope(|s| {
            let handles: Vec<_> = world
                .iter()
                .map(|ep| {
                    s.spawn(move || {
                        let value = if ep.is_coordinator() { Some(1234) } else { None };
                        ep.broadcast_total(value).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(totals, vec![1234; 4]);
    }

    #[test]
    fn coordinator_must_supply_total() {
        let world = LocalWorld::create(1).unwrap();
        assert!(matches!(world[0].broadcast_total(None), Err(TransportError::InvalidWorld(_))));
        assert_eq!(world[0].broadcast_total(Some(9)), Ok(9));
    }

    #[test]
    fn abort_wakes_blocked_receivers() {
        let mut world = LocalWorld::create(3).unwrap();
        let aborter = world.pop().unwrap();

        thread::scope(|s| {
            let waiters: Vec<_> = world
                .iter()
                .map(|ep| s.spawn(move || ep.recv(2, Tag::ChunkLength)))
                .collect();

            thread::sleep(Duration::from_millis(20));
            aborter.abort("bad padding");

            for w in waiters {
                let err = w.join().unwrap().unwrap_err();
                assert_eq!(err, TransportError::Aborted { by: 2, reason: "bad padding".into() });
            }
        });
    }

    #[test]
    fn first_abort_wins_and_blocks_sends() {
        let world = LocalWorld::create(2).unwrap();
        world[1].abort("first");
        world[0].abort("second");

        let err = world[0].send(1, Message::BarrierArrive).unwrap_err();
        assert_eq!(err, TransportError::Aborted { by: 1, reason: "first".into() });
        assert!(err.is_aborted());
    }

    #[test]
    fn dropped_peer_disconnects() {
        let mut world = LocalWorld::create(2).unwrap();
        let peer = world.pop().unwrap();
        drop(peer);

        assert_eq!(
            world[0].recv(1, Tag::ChunkLength),
            Err(TransportError::Disconnected { peer: 1 })
        );
    }

    #[test]
    fn messages_sent_before_drop_are_still_delivered() {
        let mut world = LocalWorld::create(2).unwrap();
        let peer = world.pop().unwrap();
        peer.send(0, Message::ChunkLength(3)).unwrap();
        drop(peer);

        assert_eq!(world[0].recv(1, Tag::ChunkLength), Ok(Message::ChunkLength(3)));
        assert!(world[0].recv(1, Tag::Transformed).is_err());
    }
}
