//! Select scenarios from spec.md §8.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chansel::{select, Channel, ChannelError, RecvIntent, SelectOp, SendIntent};

// Scenario 4: c1 full with 9, c2 empty. select([RECV c1, SEND c2]) picks
// index 0 (lowest-index tie-break) since both could be argued ready, but
// only RECV on c1 is actually satisfiable up front.
#[test]
fn scenario_4_lowest_index_tie_break() {
    let c1 = Channel::<i32>::bounded(1);
    let c2 = Channel::<i32>::bounded(1);
    c1.try_send(9).unwrap();

    let mut out = None;
    let mut recv_intent = RecvIntent::new(&c1, &mut out);
    let mut send_intent = SendIntent::new(&c2, 5);
    let mut ops: Vec<&mut dyn SelectOp> = vec![&mut recv_intent, &mut send_intent];

    let winner = select(&mut ops).unwrap();
    assert_eq!(winner, 0);
    assert_eq!(out, Some(9));
}

// Scenario 4b: when both intents are genuinely ready at once, the lowest
// index wins even though the higher one would also succeed.
#[test]
fn scenario_4b_both_ready_lowest_index_wins() {
    let c1 = Channel::<i32>::bounded(1);
    let c2 = Channel::<i32>::bounded(1);
    c1.try_send(9).unwrap();
    // c2 has room, so a SEND intent on it is also immediately ready.

    let mut out = None;
    let mut recv_intent = RecvIntent::new(&c1, &mut out);
    let mut send_intent = SendIntent::new(&c2, 5);
    let mut ops: Vec<&mut dyn SelectOp> = vec![&mut recv_intent, &mut send_intent];

    let winner = select(&mut ops).unwrap();
    assert_eq!(winner, 0);
    assert_eq!(c2.try_receive(), Err(ChannelError::Empty));
}

// Scenario 5: select blocks on a full channel's send intent; closing from
// another thread wakes it with CLOSED_ERROR at that intent's index.
#[test]
fn scenario_5_close_wakes_blocked_select() {
    let c = Channel::<i32>::bounded(1);
    c.try_send(1).unwrap(); // full

    let c_closer = Arc::clone(&c);
    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        c_closer.close().unwrap();
    });

    let mut send_intent = SendIntent::new(&c, 2);
    let mut ops: Vec<&mut dyn SelectOp> = vec![&mut send_intent];
    let result = select(&mut ops);

    closer.join().unwrap();
    assert_eq!(result, Err((0, ChannelError::Closed)));
}

#[test]
fn select_over_three_channels_wakes_on_whichever_fires() {
    let c1 = Channel::<i32>::bounded(1);
    let c2 = Channel::<i32>::bounded(1);
    let c3 = Channel::<i32>::bounded(1);

    let c2_sender = Arc::clone(&c2);
    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        c2_sender.send(100).unwrap();
    });

    let mut out1 = None;
    let mut out2 = None;
    let mut out3 = None;
    let mut r1 = RecvIntent::new(&c1, &mut out1);
    let mut r2 = RecvIntent::new(&c2, &mut out2);
    let mut r3 = RecvIntent::new(&c3, &mut out3);
    let mut ops: Vec<&mut dyn SelectOp> = vec![&mut r1, &mut r2, &mut r3];

    let winner = select(&mut ops).unwrap();
    assert_eq!(winner, 1);
    assert_eq!(out2, Some(100));

    sender.join().unwrap();
}

#[test]
fn select_never_holds_two_channel_mutexes_at_once() {
    // Regression guard: registering/attempting across many channels must
    // not deadlock against concurrent close() calls on each of them.
    let channels: Vec<_> = (0..8).map(|_| Channel::<i32>::bounded(1)).collect();
    for c in &channels {
        c.try_send(0).unwrap();
    }

    let mut outs: Vec<Option<i32>> = vec![None; channels.len()];
    let mut intents: Vec<RecvIntent<i32>> = channels
        .iter()
        .zip(outs.iter_mut())
        .map(|(c, out)| RecvIntent::new(c, out))
        .collect();
    let mut ops: Vec<&mut dyn SelectOp> = intents.iter_mut().map(|i| i as &mut dyn SelectOp).collect();

    let winner = select(&mut ops).unwrap();
    assert_eq!(winner, 0);
}
