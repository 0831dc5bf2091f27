//! Проверка согласованности SkipList.
//!
//! Строит список из случайных чисел и сверяет его с отсортированным `Vec`:
//! порядок, доступ по рангу и `index_of` до и после `preen`. Затем
//! многократно удаляет половину элементов (сначала по рангу, затем по
//! значению), проверяя список после каждого раунда.

use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rankskip::{
    logging::{init_logging, log_error, LoggingConfig},
    ErrorExt, Settings, SkipList, SkipListError, ValidationError,
};
use tracing::{debug, error, info};

/// Аргументы командной строки.
#[derive(Parser)]
#[command(name = "rankskip-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consistency checker for the rankskip SkipList", long_about = None)]
struct Cli {
    /// Число элементов в проверяемом списке
    #[arg(help = "Количество случайных элементов")]
    test_size: usize,
    /// Seed для генерации данных и высот узлов
    #[arg(short, long, help = "Seed (по умолчанию RANKSKIP_SEED или случайный)")]
    seed: Option<u64>,
    /// Уровень логирования
    #[arg(long, help = "Уровень логирования (перекрывает RANKSKIP_LOG_LEVEL)")]
    log_level: Option<String>,
    /// Печатать статистику уровней после построения
    #[arg(long, help = "Вывести распределение высот узлов")]
    stats: bool,
}

/// Способ удаления элементов в раунде.
#[derive(Debug, Clone, Copy)]
enum DeleteMode {
    ByRank,
    ByValue,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Пишет в лог первопричину сбоя: ошибки списка логируются по их
/// статус-коду, расхождения с моделью как ошибки.
fn report(err: &anyhow::Error) {
    let cause = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<SkipListError>()
            .map(|e| e as &dyn ErrorExt)
            .or_else(|| {
                cause
                    .downcast_ref::<ValidationError>()
                    .map(|e| e as &dyn ErrorExt)
            })
    });

    match cause {
        Some(cause) => log_error(cause),
        None => error!("Check failed: {err:#}"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load().context("failed to load RANKSKIP_* settings")?;

    if let Some(level) = cli.log_level.clone() {
        settings.log_level = level;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    init_logging(&LoggingConfig::from_settings(&settings))
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    settings.seed = Some(seed);
    info!(seed, test_size = cli.test_size, "Starting SkipList check");

    let mut rng = StdRng::seed_from_u64(seed);

    for mode in [DeleteMode::ByRank, DeleteMode::ByValue] {
        let (mut list, mut model) = build(&settings, cli.test_size, &mut rng);

        if cli.stats {
            println!("{}", list.statistics().format_report());
        }

        check(&mut list, &model).context("freshly built list")?;
        shrink_to_empty(&mut list, &mut model, mode, &mut rng)?;
    }

    info!("Tests passed!");
    Ok(())
}

/// Создаёт список из `size` случайных чисел в диапазоне `0..2*size` и его
/// отсортированную модель.
fn build(
    settings: &Settings,
    size: usize,
    rng: &mut StdRng,
) -> (SkipList<usize>, Vec<usize>) {
    info!(size, "Creating a SkipList with random elements");

    let upper = size.saturating_mul(2).max(1);
    let values: Vec<usize> = (0..size).map(|_| rng.gen_range(0..upper)).collect();

    let mut list = SkipList::from_settings(settings);
    list.extend(values.iter().copied());

    let mut model = values;
    model.sort();

    (list, model)
}

fn shrink_to_empty(
    list: &mut SkipList<usize>,
    model: &mut Vec<usize>,
    mode: DeleteMode,
    rng: &mut StdRng,
) -> Result<()> {
    while !list.is_empty() {
        let delete_count = list.len().div_ceil(2);
        info!(
            ?mode,
            delete_count,
            remain = list.len() - delete_count,
            "Deleting elements"
        );

        match mode {
            DeleteMode::ByRank => {
                for _ in 0..delete_count {
                    let rank = rng.gen_range(0..list.len());
                    let removed = list.delete_at(rank as isize)?;
                    let expected = model.remove(rank);
                    ensure!(
                        removed == expected,
                        "delete_at({rank}) returned {removed}, expected {expected}"
                    );
                }
            }
            DeleteMode::ByValue => {
                let mut population: Vec<usize> =
                    model.choose_multiple(rng, delete_count).copied().collect();
                population.shuffle(rng);

                for value in population {
                    list.remove(&value)
                        .with_context(|| format!("remove({value})"))?;
                    let rank = model.partition_point(|v| *v < value);
                    model.remove(rank);
                }
            }
        }

        check(list, model).with_context(|| format!("after deleting by {mode:?}"))?;
    }

    Ok(())
}

/// Сверяет список с моделью, затем выполняет `preen` и сверяет повторно.
fn check(
    list: &mut SkipList<usize>,
    model: &[usize],
) -> Result<()> {
    debug!(len = list.len(), "checking");
    compare(list, model)?;

    debug!(height = list.height(), "preening");
    list.preen();

    debug!(len = list.len(), "checking");
    compare(list, model)
}

fn compare(
    list: &SkipList<usize>,
    model: &[usize],
) -> Result<()> {
    ensure!(
        list.len() == model.len(),
        "length {} != model length {}",
        list.len(),
        model.len()
    );
    ensure!(list.iter().eq(model.iter()), "iteration order differs");

    for (rank, expected) in model.iter().enumerate() {
        let found = list.get(rank as isize)?;
        ensure!(
            found == expected,
            "get({rank}) returned {found}, expected {expected}"
        );
    }

    let mut distinct = model.to_vec();
    distinct.dedup();
    for value in distinct {
        let rank = list.index_of(&value)?;
        let expected = model.partition_point(|v| *v < value);
        ensure!(
            rank == expected,
            "index_of({value}) returned {rank}, expected {expected}"
        );
    }

    list.validate_invariants()?;
    Ok(())
}
