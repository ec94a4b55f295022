//! Host-level scenarios for button conditioning.

use fan_remote::{ButtonSetup, ButtonState, Buttons, Tick, TickRate, Triggers};

const RATE: TickRate = TickRate::from_millis(10);

/// Run `buttons` from tick `0` through `last`, sampling `pressed(tick, channel)`, and collect the
/// ticks at which any trigger survived, with the surviving mask.
fn run(
    buttons: &mut Buttons,
    last: u32,
    pressed: impl Fn(u32, usize) -> bool,
) -> Vec<(u32, Triggers)> {
    let mut fired = Vec::new();
    for tick in 0..=last {
        let poll = buttons.service(Tick(tick), &mut |channel: usize| pressed(tick, channel));
        if !poll.triggers.is_empty() {
            fired.push((tick, poll.triggers));
        }
    }
    fired
}

#[test]
fn held_button_without_repeat_fires_once() {
    let mut buttons = Buttons::new(&[ButtonSetup::new(50, 0)], RATE).expect("buttons");
    let fired = run(&mut buttons, 10, |_, _| true);
    assert_eq!(fired, [(5, Triggers::single(0))]);
}

#[test]
fn held_button_repeats_every_interval() {
    let setups = [ButtonSetup::new(50, 0), ButtonSetup::new(50, 330)];
    let mut buttons = Buttons::new(&setups, RATE).expect("buttons");
    let fired = run(&mut buttons, 104, |_, channel| channel == 1);
    let ticks: Vec<u32> = fired.iter().map(|&(tick, _)| tick).collect();
    assert_eq!(ticks, [5, 38, 71, 104]);
    assert!(fired.iter().all(|&(_, triggers)| triggers == Triggers::single(1)));
}

#[test]
fn short_press_is_rejected() {
    let mut buttons = Buttons::new(&[ButtonSetup::new(50, 330)], RATE).expect("buttons");
    // Pressed for ticks 0..=4, released at 5: one tick short of confirmation.
    let fired = run(&mut buttons, 20, |tick, _| tick < 5);
    assert!(fired.is_empty());
    assert_eq!(
        buttons.channel(0).map(|channel| channel.state()),
        Some(ButtonState::Idle)
    );
}

#[test]
fn chatter_never_confirms() {
    let mut buttons = Buttons::new(&[ButtonSetup::new(20, 0)], RATE).expect("buttons");
    let fired = run(&mut buttons, 50, |tick, _| tick % 2 == 0);
    assert!(fired.is_empty());
}

#[test]
fn release_and_press_again_fires_again() {
    let mut buttons = Buttons::new(&[ButtonSetup::new(50, 0)], RATE).expect("buttons");
    let fired = run(&mut buttons, 30, |tick, _| tick <= 10 || tick >= 20);
    let ticks: Vec<u32> = fired.iter().map(|&(tick, _)| tick).collect();
    assert_eq!(ticks, [5, 25]);
}

#[test]
fn lowest_active_channel_suppresses_higher_triggers() {
    // Channel 2 is pressed first and confirms at tick 5. Channel 0 is pressed at tick 2 and
    // confirms at tick 7. From then on channel 0 is the lowest active channel, so its own bit
    // survives and channel 2's repeat at tick 10 is masked off.
    let setups = [
        ButtonSetup::new(50, 0),
        ButtonSetup::new(50, 0),
        ButtonSetup::new(50, 50),
    ];
    let mut buttons = Buttons::new(&setups, RATE).expect("buttons");
    let fired = run(&mut buttons, 12, |tick, channel| match channel {
        0 => tick >= 2,
        2 => true,
        _ => false,
    });
    assert_eq!(
        fired,
        [(5, Triggers::single(2)), (7, Triggers::single(0))]
    );
    assert_eq!(
        buttons.channel(2).map(|channel| channel.state()),
        Some(ButtonState::Active)
    );
}

#[test]
fn triggered_channels_do_not_suppress() {
    // Channel 0 is only debouncing (Triggered) when channel 1 confirms.
    let setups = [ButtonSetup::new(100, 0), ButtonSetup::new(50, 0)];
    let mut buttons = Buttons::new(&setups, RATE).expect("buttons");
    let fired = run(&mut buttons, 7, |_, _| true);
    assert_eq!(fired, [(5, Triggers::single(1))]);
    assert_eq!(
        buttons.channel(0).map(|channel| channel.state()),
        Some(ButtonState::Triggered)
    );
}

#[test]
fn any_active_tracks_held_buttons() {
    let mut buttons = Buttons::new(&[ButtonSetup::new(50, 0)], RATE).expect("buttons");
    let mut pressed = |_: usize| true;
    assert!(buttons.service(Tick(0), &mut pressed).any_active);
    let mut released = |_: usize| false;
    assert!(!buttons.service(Tick(1), &mut released).any_active);
}
