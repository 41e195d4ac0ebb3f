/// Example: link debouncing against a scripted flag trace.
///
/// This feeds a noisy controller-link trace through the hysteresis filter
/// and a panel, showing which polls actually flip the indicator.
///
/// Run with: cargo run --example link_debounce
use line_monitor::monitor::hysteresis::HysteresisFilter;
use line_monitor::panel::Panel;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // A flap, a sustained connect, then a sustained drop.
    let trace = [
        false, true, true, false, true, true, true, false, false, false,
    ];

    let mut filter = HysteresisFilter::new(3);
    let panel = Panel::new();

    for (poll, flag) in trace.iter().enumerate() {
        match filter.observe(*flag) {
            Some(new_state) => {
                panel.set_link(new_state).await;
                tracing::info!(
                    poll = poll + 1,
                    observed = flag,
                    committed = %new_state,
                    "indicator flipped"
                );
            }
            None => {
                tracing::info!(
                    poll = poll + 1,
                    observed = flag,
                    pending = filter.pending(),
                    "no change"
                );
            }
        }
    }

    let state = panel.state().await;
    tracing::info!(link = %state.link, "final indicator");
}
