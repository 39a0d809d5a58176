use dmxp_simfifo::FIFO::{ChannelBuilder, ThreadChannel};
use dmxp_simfifo::{Error, TryWriteError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn zero_capacity_is_rejected() {
    assert!(matches!(
        ThreadChannel::<u8>::new(0),
        Err(Error::ZeroCapacity)
    ));
}

#[test]
fn full_buffer() {
    let channel = ThreadChannel::new(4).unwrap();

    // Fill buffer
    for i in 0..4u32 {
        assert!(channel.try_write(i).is_ok());
    }

    // Next enqueue should fail
    assert_eq!(channel.try_write(9), Err(TryWriteError::Full(9)));

    // Dequeue one
    assert_eq!(channel.try_read(), Some(0));

    // Enqueue should succeed now
    assert!(channel.try_write(9).is_ok());
    assert_eq!(channel.len(), 4);
}

#[test]
fn spsc_preserves_order() {
    let channel = Arc::new(ChannelBuilder::new().with_capacity(8).build_threaded::<u32>().unwrap());

    let tx = channel.clone();
    let p = thread::spawn(move || {
        for i in 0..1000u32 {
            tx.write(i).unwrap();
        }
    });

    let rx = channel.clone();
    let c = thread::spawn(move || {
        for expected in 0..1000u32 {
            assert_eq!(rx.read().unwrap(), expected);
        }
    });

    p.join().unwrap();
    c.join().unwrap();
    assert!(channel.is_empty());
}

#[test]
fn builder_name_reaches_the_threaded_channel() {
    let channel = ChannelBuilder::new()
        .with_name("uplink")
        .with_capacity(2)
        .build_threaded::<u8>()
        .unwrap();
    assert_eq!(channel.name(), "uplink");

    let rendered = format!("{channel:?}");
    assert!(rendered.contains("uplink"), "{rendered}");
    assert!(rendered.contains("capacity: 2"), "{rendered}");

    assert_eq!(ThreadChannel::<u8>::new(1).unwrap().name(), "fifo");
}

#[test]
fn mpmc_correctness_many_threads() {
    let channel = Arc::new(ThreadChannel::<u64>::new(16).unwrap());
    let producers = 4;
    let consumers = 4;
    let msgs_per_producer = 1000u64;
    let total_msgs = producers * msgs_per_producer;

    let mut handles = vec![];

    // Spawn producers
    for p_id in 0..producers {
        let channel = channel.clone();
        handles.push(thread::spawn(move || {
            for i in 0..msgs_per_producer {
                channel.write(p_id * msgs_per_producer + i).unwrap();
            }
        }));
    }

    // Spawn consumers
    let received_count = Arc::new(AtomicU64::new(0));
    let received_sum = Arc::new(AtomicU64::new(0));
    for _ in 0..consumers {
        let channel = channel.clone();
        let received_count = received_count.clone();
        let received_sum = received_sum.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..total_msgs / consumers {
                let v = channel.read().unwrap();
                received_sum.fetch_add(v, Ordering::Relaxed);
                received_count.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(received_count.load(Ordering::SeqCst), total_msgs);
    assert_eq!(
        received_sum.load(Ordering::SeqCst),
        total_msgs * (total_msgs - 1) / 2
    );
}

#[test]
fn writer_blocks_until_reader_frees_a_slot() {
    let channel = Arc::new(ThreadChannel::new(1).unwrap());
    channel.write(1u8).unwrap();

    let tx = channel.clone();
    let writer = thread::spawn(move || tx.write(2));

    thread::sleep(Duration::from_millis(50));
    assert!(!writer.is_finished());
    assert_eq!(channel.len(), 1);

    assert_eq!(channel.read().unwrap(), 1);
    writer.join().unwrap().unwrap();
    assert_eq!(channel.read().unwrap(), 2);
}

#[test]
fn close_wakes_blocked_reader_after_draining() {
    let channel = Arc::new(ThreadChannel::<u32>::new(2).unwrap());
    channel.write(7).unwrap();

    let rx = channel.clone();
    let reader = thread::spawn(move || {
        let first = rx.read();
        let second = rx.read();
        (first.ok(), matches!(second, Err(Error::Closed)))
    });

    thread::sleep(Duration::from_millis(20));
    channel.close();
    assert_eq!(reader.join().unwrap(), (Some(7), true));

    assert!(channel.is_closed());
    assert!(matches!(channel.write(1), Err(Error::Closed)));
    assert_eq!(channel.try_write(1), Err(TryWriteError::Closed(1)));
}

#[test]
fn close_wakes_blocked_writer() {
    let channel = Arc::new(ThreadChannel::new(1).unwrap());
    channel.write(0u32).unwrap();

    let tx = channel.clone();
    let writer = thread::spawn(move || tx.write(1));
    thread::sleep(Duration::from_millis(20));
    channel.close();

    assert!(matches!(writer.join().unwrap(), Err(Error::Closed)));
}

#[test]
fn timeouts_use_wall_clock() {
    let channel = ThreadChannel::<u32>::new(1).unwrap();
    assert!(matches!(
        channel.read_timeout(Duration::from_millis(10)),
        Err(Error::TimedOut)
    ));

    channel.write(3).unwrap();
    let err = channel
        .write_timeout(4, Duration::from_millis(10))
        .unwrap_err();
    assert!(matches!(err.error, Error::TimedOut));
    assert_eq!(err.into_inner(), 4);

    assert_eq!(channel.read_timeout(Duration::from_millis(10)).unwrap(), 3);
}
