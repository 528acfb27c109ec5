use crate::helpe::*;

/// Everything `occupa` derives from a trace over one window.
#[derive(Clone, Debug)]
pub struct Report {
    pub window:             Window,
    pub universe:           IntervalSet,
    pub free_series:        FreeSeries,
    pub free_slots:         Vec<FreeSlot>,
    pub gaps:               ResourceGaps,
    pub fragmentation:      Fragmentation,
    pub mean_utilisation:   f64,
    pub max_load:           u64,
}

impl Report {
    /// Free resource × time within the window.
    pub fn free_area(&self) -> f64 {
        self.free_slots.iter().map(FreeSlot::area).sum()
    }

    /// Fraction of the window's capacity left idle.
    pub fn idle_ratio(&self) -> f64 {
        self.free_area() / (self.universe.total() as f64 * self.window.duration())
    }
}

/// Runs the whole pipeline over `window` (default: the trace's
/// [default window](Trace::default_window)): free series, free slots,
/// per-resource gaps, fragmentation and mean utilisation.
pub fn analyze(trace: &Trace, window: Option<Window>, policy: FragPolicy) -> Result<Report, TraceError> {
    let analysis_cost = Instant::now();
    let window = match window {
        Some(w) => w,
        None => trace.default_window()?,
    };
    let universe = trace.universe()?;
    let free_series = trace.free_series(Some(window))?;
    let free_slots = extract_free_slots(&free_series, window.end())?;
    let gaps = free_resources_gaps(&free_slots, &universe);
    let frag = fragmentation(&gaps, policy, window.duration());
    let mean_utilisation = trace.mean_utilisation(window.begin(), window.end())?;

    info!(
        "Analyzed {} jobs over [{}, {}): {} samples, {} free slots, mean fragmentation {:.4} ({} μs)",
        trace.len(),
        window.begin(),
        window.end(),
        free_series.len(),
        free_slots.len(),
        frag.mean(),
        analysis_cost.elapsed().as_micros()
    );

    Ok(Report {
        window,
        universe,
        free_series,
        free_slots,
        gaps,
        fragmentation: frag,
        mean_utilisation,
        max_load: trace.max_load(),
    })
}

/// Same as [analyze], for many independent traces at once. Results come
/// back in input order.
pub fn analyze_many(
    traces: Vec<Trace>,
    window: Option<Window>,
    policy: FragPolicy,
) -> Vec<Result<Report, TraceError>> {
    traces.into_par_iter()
        .map(|t| analyze(&t, window, policy))
        .collect()
}
