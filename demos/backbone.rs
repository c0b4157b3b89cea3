use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spine::community::{backbone_graph, ResolutionSweep};
use spine::{
    total_tokens, DiagnosticMeans, DiagnosticMetric, DocumentTopics, NetworkSynthesizer,
    RuntimeConfig, TopicDiagnostics, TopicWords,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Synthetic corpus: 3 topics, 40 documents per dominant topic, 12-word vocabulary.
    let n_topics = 3;
    let n_words = 12;
    let mut rng = StdRng::seed_from_u64(2024);

    let mut doc_rows = Vec::new();
    for dominant in 0..n_topics {
        for _ in 0..40 {
            let mut row: Vec<f64> = (0..n_topics).map(|_| 0.1 * rng.random::<f64>()).collect();
            row[dominant] += 0.8;
            let sum: f64 = row.iter().sum();
            row.iter_mut().for_each(|x| *x /= sum);
            doc_rows.push(row);
        }
    }

    // Each topic puts most of its mass on its own block of four words.
    let word_rows: Vec<Vec<f64>> = (0..n_topics)
        .map(|t| {
            let mut row: Vec<f64> = (0..n_words)
                .map(|w| if w / 4 == t { 0.2 } else { 0.025 })
                .collect();
            let sum: f64 = row.iter().sum();
            row.iter_mut().for_each(|x| *x /= sum);
            row
        })
        .collect();

    let docs = DocumentTopics::from_rows(&doc_rows)?;
    let words = TopicWords::from_rows(&word_rows)?;

    let synth = NetworkSynthesizer::new(&RuntimeConfig::new())?;
    println!("workers={}", synth.pool().n_workers());

    let backbone = synth.synthesize(&docs)?;
    println!(
        "n_nodes={} network_edges={} mst_edges={} components={} total_weight={:.4}",
        backbone.n_nodes,
        backbone.n_network_edges,
        backbone.forest.len(),
        backbone.forest.n_components(),
        backbone.forest.total_weight()
    );
    println!("source,target,weight");
    for (s, t, w) in backbone.forest.weighted_pairs().iter().take(5) {
        println!("{},{},{:.6}", s, t, w);
    }
    println!("...");

    // Diagnostics as a topic-modeling toolkit would report them.
    let topics: Vec<TopicDiagnostics> = (0..n_topics)
        .map(|t| {
            TopicDiagnostics::from_attributes([
                ("tokens", 400.0 + 10.0 * t as f64),
                ("coherence", -50.0 - t as f64),
                ("word-length", 5.5),
                ("exclusivity", 0.6),
            ])
        })
        .collect();
    let means = DiagnosticMeans::from_topics(&topics)?;
    for metric in DiagnosticMetric::ALL {
        println!("mean {}={:.4}", metric.name(), means.get(metric));
    }

    let report = synth.evaluate_perplexity(&docs, &words, total_tokens(&topics))?;
    println!(
        "perplexity={:.4} (underflowed documents: {})",
        report.perplexity,
        report.n_underflowed()
    );

    let graph = backbone_graph(&backbone.forest);
    let sweep = ResolutionSweep::new().run(synth.pool(), &graph)?;
    for iv in &sweep.intervals {
        println!(
            "Resolution interval: [{}, {}], Communities: {}",
            iv.start, iv.end, iv.n_communities
        );
    }
    if let Some(iv) = sweep.most_stable() {
        println!("most stable: {} communities", iv.n_communities);
    }

    Ok(())
}
