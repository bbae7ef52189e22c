// The renderer slot is process-wide, so everything touching it lives in this
// one test binary and one test function.

use std::sync::{Arc, Mutex};

use vizlab::renderer::{self, Renderer};
use vizlab::{ChartError, ChartRequest, Dataset, FigureSpec};

struct Recording {
    titles: Arc<Mutex<Vec<String>>>,
}

impl Renderer for Recording {
    fn display(&self, figure: &FigureSpec) -> anyhow::Result<()> {
        self.titles.lock().unwrap().push(figure.layout.title.clone());
        Ok(())
    }
}

#[test]
fn test_draw_goes_through_installed_renderer() {
    let data = Dataset::from_columns(vec![("a", vec![1, 2, 3])]);

    // Nothing installed yet: drawing is skipped, the figure still comes back
    assert!(renderer::renderer().is_none());
    let figure = vizlab::line(&data, ChartRequest::new("a")).unwrap();
    assert_eq!(figure.traces.len(), 1);

    let titles = Arc::new(Mutex::new(Vec::new()));
    renderer::init_renderer(Box::new(Recording { titles: titles.clone() })).unwrap();

    vizlab::bar(&data, ChartRequest::new("a").title("drawn")).unwrap();
    vizlab::bar(&data, ChartRequest::new("a").title("hidden").draw(false)).unwrap();
    assert_eq!(*titles.lock().unwrap(), vec!["drawn".to_string()]);

    let again = renderer::init_renderer(Box::new(Recording { titles: titles.clone() }));
    assert!(matches!(again, Err(ChartError::RendererAlreadyInitialized)));
}
