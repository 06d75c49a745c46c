//! Memoized perf pipeline
//!
//! Owns the resolved data, the active mask and the chart renderer. The scaled
//! plot and its marks are only recomputed when the data generation, the
//! active mask, the overlay toggles or the x axis change.

use crate::chart::{ChartLayout, ChartOptions, ChartRenderer, LayoutInputs, Rendered};
use crate::fetch::{FetchContext, FetchKey, PerfFetcher, PerfResource, Transport};
use crate::key::{ActiveMask, PlotKey};
use crate::marks::{build_marks, LinkContext, Mark, MarkConfig};
use crate::query::{PerfQuery, Toggles, XAxis};
use crate::scale::{scale_results, ScaledPlot};
use crate::series::PerfData;

#[derive(Debug, Clone, PartialEq)]
struct Memo {
    generation: u64,
    active: Vec<bool>,
    toggles: Toggles,
    x_axis: XAxis,
    plot: ScaledPlot,
    marks: Vec<Mark>,
}

impl Memo {
    fn is_current(&self, generation: u64, active: &[bool], toggles: Toggles, x_axis: XAxis) -> bool {
        self.generation == generation
            && self.active == active
            && self.toggles == toggles
            && self.x_axis == x_axis
    }
}

#[derive(Debug, Clone)]
pub struct PerfPipeline {
    resource: PerfResource,
    mask: ActiveMask,
    links: LinkContext,
    config: MarkConfig,
    renderer: ChartRenderer,
    memo: Option<Memo>,
    computations: usize,
}

impl PerfPipeline {
    pub fn new(links: LinkContext, options: ChartOptions) -> Self {
        Self {
            resource: PerfResource::new(),
            mask: ActiveMask::default(),
            links,
            config: MarkConfig::default(),
            renderer: ChartRenderer::new(options),
            memo: None,
            computations: 0,
        }
    }

    pub fn with_config(mut self, config: MarkConfig) -> Self {
        self.config = config;
        self.memo = None;
        self
    }

    pub fn resource(&self) -> &PerfResource {
        &self.resource
    }

    pub fn data(&self) -> &PerfData {
        self.resource.data()
    }

    pub fn mask(&self) -> &ActiveMask {
        &self.mask
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Number of times the plot and marks were rebuilt
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Track a new request. Returns false when `key` is already current.
    pub fn request(&mut self, key: FetchKey) -> bool {
        self.resource.request(key)
    }

    /// Accept data resolved for `key`, resetting the mask to all active
    pub fn resolve(&mut self, key: &FetchKey, data: PerfData) -> bool {
        let len = data.results.len();
        if !self.resource.resolve(key, data) {
            return false;
        }
        self.mask.reset(len);
        true
    }

    /// Fetch the data for `query` unless it is already current.
    ///
    /// The project visibility seen in the response is recorded on `context`.
    pub async fn load<T: Transport>(
        &mut self,
        fetcher: &PerfFetcher<T>,
        context: &mut FetchContext,
        query: &PerfQuery,
    ) -> bool {
        let key = context.fetch_key(query);
        if !self.request(key.clone()) {
            return false;
        }
        let data = fetcher.fetch(context, query).await;
        context.observe(&data);
        self.resolve(&key, data)
    }

    pub fn toggle(&mut self, index: usize) {
        self.mask.toggle(index);
    }

    pub fn toggle_all(&mut self) {
        self.mask.toggle_all();
    }

    pub fn plot_key(&self, expanded: bool) -> PlotKey {
        PlotKey::new(&self.resource.data().results, &self.mask, expanded)
    }

    fn refresh(&mut self, toggles: Toggles, x_axis: XAxis) {
        let generation = self.resource.generation();
        if let Some(memo) = &self.memo {
            if memo.is_current(generation, self.mask.as_slice(), toggles, x_axis) {
                return;
            }
        }

        let results = &self.resource.data().results;
        let plot = scale_results(results, self.mask.as_slice(), &toggles, self.config.skipped_offset);
        let marks = build_marks(&plot, &toggles, x_axis, &self.links, &self.config);
        self.computations += 1;
        tracing::debug!(
            generation,
            series = plot.series.len(),
            marks = marks.len(),
            "Rebuilt plot"
        );
        self.memo = Some(Memo {
            generation,
            active: self.mask.as_slice().to_vec(),
            toggles,
            x_axis,
            plot,
            marks,
        });
    }

    /// Scaled plot and marks for the current inputs
    pub fn plot(&mut self, toggles: Toggles, x_axis: XAxis) -> Option<(&ScaledPlot, &[Mark])> {
        self.refresh(toggles, x_axis);
        self.memo
            .as_ref()
            .map(|memo| (&memo.plot, memo.marks.as_slice()))
    }

    fn inputs(&self, toggles: Toggles, x_axis: XAxis) -> LayoutInputs {
        LayoutInputs {
            x_axis,
            toggles,
            active: self.mask.as_slice().to_vec(),
        }
    }

    pub fn layout(&mut self, toggles: Toggles, x_axis: XAxis) -> Option<ChartLayout> {
        self.refresh(toggles, x_axis);
        let inputs = self.inputs(toggles, x_axis);
        let memo = self.memo.as_ref()?;
        self.renderer.layout(&memo.plot, &memo.marks, inputs)
    }

    pub fn render(&mut self, toggles: Toggles, x_axis: XAxis) -> Rendered {
        self.refresh(toggles, x_axis);
        let inputs = self.inputs(toggles, x_axis);
        match &self.memo {
            Some(memo) => self.renderer.render(&memo.plot, &memo.marks, inputs),
            None => Rendered::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Visibility;
    use crate::fetch::tests::{MockTransport, PERF_JSON, PROJECT_JSON};
    use crate::marks::tests::{point, result};
    use crate::query::Toggle;

    fn query() -> PerfQuery {
        PerfQuery {
            branches: vec!["b".to_string()],
            testbeds: vec!["t".to_string()],
            benchmarks: vec!["k".to_string()],
            measures: vec!["m".to_string()],
            ..PerfQuery::default()
        }
    }

    fn loaded(results: usize) -> PerfPipeline {
        let mut pipeline = PerfPipeline::new(LinkContext::public("project"), ChartOptions::default());
        let key = FetchContext::new("project").fetch_key(&query());
        let data = PerfData {
            project: None,
            results: (0..results)
                .map(|i| result(vec![point(100.0 + i as f64)]))
                .collect(),
        };
        assert!(pipeline.request(key.clone()));
        assert!(pipeline.resolve(&key, data));
        pipeline
    }

    #[test]
    fn test_memoized_until_inputs_change() {
        let mut pipeline = loaded(3);
        let toggles = Toggles::default();

        pipeline.plot(toggles, XAxis::DateTime);
        pipeline.plot(toggles, XAxis::DateTime);
        assert_eq!(pipeline.computations(), 1);

        let mut boundaries = toggles;
        boundaries.set(Toggle::LowerBoundary, true);
        pipeline.plot(boundaries, XAxis::DateTime);
        assert_eq!(pipeline.computations(), 2);

        pipeline.plot(boundaries, XAxis::Version);
        assert_eq!(pipeline.computations(), 3);

        pipeline.toggle(1);
        let series = pipeline
            .plot(boundaries, XAxis::Version)
            .map(|(plot, _)| plot.series.len());
        assert_eq!(series, Some(2));
        assert_eq!(pipeline.computations(), 4);
    }

    #[test]
    fn test_new_data_resets_mask() {
        let mut pipeline = loaded(2);
        pipeline.toggle_all();
        assert_eq!(pipeline.mask().as_slice(), &[false, false]);

        let mut other = query();
        other.measures.push("m2".to_string());
        let key = FetchContext::new("project").fetch_key(&other);
        assert!(pipeline.request(key.clone()));
        // Previous data stays visible while loading
        assert_eq!(pipeline.data().results.len(), 2);

        let data = PerfData {
            project: None,
            results: (0..4).map(|_| result(vec![point(1.0)])).collect(),
        };
        assert!(pipeline.resolve(&key, data));
        assert_eq!(pipeline.mask().as_slice(), &[true; 4]);
        assert!(pipeline.plot_key(true).all_active());
    }

    #[test]
    fn test_all_inactive_renders_no_data() {
        let mut pipeline = loaded(2);
        pipeline.toggle_all();
        assert_eq!(
            pipeline.render(Toggles::default(), XAxis::DateTime),
            Rendered::NoData
        );

        pipeline.toggle(0);
        assert!(matches!(
            pipeline.render(Toggles::default(), XAxis::DateTime),
            Rendered::Svg(_)
        ));
    }

    #[tokio::test]
    async fn test_load_fetches_once_per_key() {
        let fetcher = PerfFetcher::new(
            MockTransport::default()
                .with("/v0/projects/project", PROJECT_JSON)
                .with("/v0/projects/project/perf", PERF_JSON),
        );
        let mut context = FetchContext::new("project");
        let mut pipeline = PerfPipeline::new(LinkContext::public("project"), ChartOptions::default());

        assert!(pipeline.load(&fetcher, &mut context, &query()).await);
        assert!(!pipeline.load(&fetcher, &mut context, &query()).await);
        assert_eq!(fetcher.transport().requests.borrow().len(), 1);
        assert_eq!(pipeline.mask().len(), pipeline.data().results.len());
        assert_eq!(context.visibility, Some(Visibility::Public));
    }

    #[tokio::test]
    async fn test_private_project_loads_nothing_more_unauthenticated() {
        let private = PROJECT_JSON.replace("public", "private");
        let fetcher = PerfFetcher::new(
            MockTransport::default()
                .with("/v0/projects/project", &private)
                .with("/v0/projects/project/perf", PERF_JSON),
        );
        let mut context = FetchContext::new("project");
        let mut pipeline = PerfPipeline::new(LinkContext::public("project"), ChartOptions::default());
        let init = PerfQuery {
            measures: Vec::new(),
            ..query()
        };

        assert!(pipeline.load(&fetcher, &mut context, &init).await);
        assert_eq!(context.visibility, Some(Visibility::Private));

        assert!(pipeline.load(&fetcher, &mut context, &query()).await);
        assert!(pipeline.data().results.is_empty());
        assert_eq!(
            fetcher.transport().requests.borrow().as_slice(),
            &["/v0/projects/project".to_string()]
        );
    }
}
