use std::io::Write;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};
use statrs::distribution::{Bernoulli, Binomial, Cauchy, Exp, Gamma, Geometric, Normal, Poisson};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Distribution selector letter from the command line. The same enum drives
/// validation, the usage text and generation dispatch, so an accepted letter
/// always has a sampler behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
enum Selector {
    Uniform,
    Normal,
    Binomial,
    Exponential,
    Gamma,
    Bernoulli,
    Geometric,
    Cauchy,
    Poisson,
    TrueUniform,
}

impl Selector {
    fn code(self) -> char {
        match self {
            Selector::Uniform => 'u',
            Selector::Normal => 'n',
            Selector::Binomial => 'b',
            Selector::Exponential => 'e',
            Selector::Gamma => 'g',
            Selector::Bernoulli => 'l',
            Selector::Geometric => 'o',
            Selector::Cauchy => 'c',
            Selector::Poisson => 'p',
            Selector::TrueUniform => 't',
        }
    }

    fn from_code(code: char) -> Option<Selector> {
        Selector::iter().find(|s| s.code() == code)
    }

    fn help(self) -> &'static str {
        match self {
            Selector::Uniform => "Uniform distribution, ARG1 is range-left, ARG2 is range-right",
            Selector::Normal => "Normal distribution, ARG1 is mean, ARG2 is sigma",
            Selector::Binomial => "Binomial distribution, ARG1 is trials, ARG2 is success probability",
            Selector::Exponential => "Exponential distribution, ARG1 is lambda, ARG2 is unused",
            Selector::Gamma => "Gamma distribution, ARG1 is alpha, ARG2 is beta",
            Selector::Bernoulli => "Bernoulli distribution, ARG1 and ARG2 are unused",
            Selector::Geometric => "Geometric distribution, ARG1 and ARG2 are unused",
            Selector::Cauchy => "Cauchy distribution, ARG1 is median, ARG2 is sigma",
            Selector::Poisson => "Poisson distribution, ARG1 is mean, ARG2 is unused",
            Selector::TrueUniform => "Same as -u, but sampled from the OS entropy source (non-pseudo)",
        }
    }
}

/// One validated invocation: `randomaker TYPE TOTAL ARG1 ARG2`.
#[derive(Debug)]
struct Request {
    selector: Selector,
    total: u64,
    param1: f64,
    param2: f64,
}

fn usage() -> String {
    let mut s = String::new();
    s.push_str("Usage: randomaker TYPE TOTAL ARG1 ARG2\n");
    s.push_str("Option TOTAL:\n  Total of random numbers to be created\n");
    s.push_str("Option TYPE:\n");
    for sel in Selector::iter() {
        s.push_str(&format!("  -{} : {}\n", sel.code(), sel.help()));
    }
    s
}

fn parse_selector(arg: &str) -> Result<Selector> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(code), None) => {
            Selector::from_code(code).ok_or_else(|| anyhow!("unknown distribution {:?}", arg))
        }
        _ => bail!("TYPE must be a dash followed by one distribution letter, got {:?}", arg),
    }
}

fn parse_total(arg: &str) -> Result<u64> {
    // rejects both negative counts and anything that looks like a flag
    if arg.starts_with('-') {
        bail!("TOTAL must not start with a dash, got {:?}", arg);
    }
    let total: u64 = arg
        .parse()
        .with_context(|| format!("TOTAL {:?} is not a whole number", arg))?;
    if total == 0 {
        bail!("TOTAL must be positive");
    }
    Ok(total)
}

fn parse_args(args: &[String]) -> Result<Request> {
    if args.len() != 4 {
        bail!("expected 4 arguments, got {}", args.len());
    }
    let selector = parse_selector(&args[0])?;
    let total = parse_total(&args[1])?;
    let param1: f64 = args[2]
        .parse()
        .with_context(|| format!("ARG1 {:?} is not a number", args[2]))?;
    let param2: f64 = args[3]
        .parse()
        .with_context(|| format!("ARG2 {:?} is not a number", args[3]))?;
    Ok(Request { selector, total, param1, param2 })
}

/// Object-safe view over the samplers, so one dispatch can mix `rand` and
/// `statrs` distributions and feed them either RNG.
trait Sampler {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;
}
impl<T: Distribution<f64>> Sampler for T {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        Distribution::sample(self, rng)
    }
}

fn build_sampler(req: &Request) -> Result<Box<dyn Sampler>> {
    let (p1, p2) = (req.param1, req.param2);
    Ok(match req.selector {
        Selector::Uniform | Selector::TrueUniform => {
            if !p1.is_finite() || !p2.is_finite() || p1 > p2 {
                bail!("bad uniform range: ARG1 {} must not exceed ARG2 {}", p1, p2);
            }
            if p1 == p2 {
                // zero-width range stays allowed, every sample is the bound itself
                Box::new(Uniform::new_inclusive(p1, p2))
            } else {
                Box::new(Uniform::new(p1, p2))
            }
        }
        Selector::Normal => Box::new(Normal::new(p1, p2).context("bad normal parameters")?),
        Selector::Binomial => {
            if !p1.is_finite() || p1 < 0.0 {
                bail!("binomial trials {} must be a non-negative number", p1);
            }
            // statrs draws one Bernoulli per trial, so an absurd count would hang
            if p1 > u32::MAX as f64 {
                bail!("binomial trials {} is too large", p1);
            }
            Box::new(Binomial::new(p2, p1 as u64).context("bad binomial parameters")?)
        }
        Selector::Exponential => Box::new(Exp::new(p1).context("bad exponential parameters")?),
        Selector::Gamma => {
            // statrs parameterizes gamma by rate, the CLI takes beta as a scale;
            // checked here since a zero beta would slip through as an infinite rate
            if !p2.is_finite() || p2 <= 0.0 {
                bail!("gamma scale {} must be positive", p2);
            }
            Box::new(Gamma::new(p1, 1.0 / p2).context("bad gamma parameters")?)
        }
        Selector::Bernoulli => Box::new(Bernoulli::new(0.5).context("bad bernoulli parameters")?),
        Selector::Geometric => Box::new(Geometric::new(0.5).context("bad geometric parameters")?),
        Selector::Cauchy => Box::new(Cauchy::new(p1, p2).context("bad cauchy parameters")?),
        Selector::Poisson => Box::new(Poisson::new(p1).context("bad poisson parameters")?),
    })
}

fn draw_samples(sampler: &dyn Sampler, rng: &mut dyn RngCore, total: u64) -> Vec<f64> {
    (0..total).map(|_| sampler.sample(&mut *rng)).collect()
}

fn write_samples<W: Write>(mut out: W, samples: &[f64]) -> Result<()> {
    for x in samples {
        writeln!(out, "{:.9}", x)?;
    }
    Ok(())
}

fn generate(req: &Request, sampler: &dyn Sampler) -> Result<()> {
    let mut rng: Box<dyn RngCore> = match req.selector {
        Selector::TrueUniform => Box::new(OsRng),
        _ => Box::new(SmallRng::from_entropy()),
    };
    let samples = draw_samples(sampler, rng.as_mut(), req.total);

    let so = std::io::stdout();
    let so = so.lock();
    let mut so = std::io::BufWriter::with_capacity(32768, so);
    write_samples(&mut so, &samples)?;
    so.flush().context("flushing stdout")?;
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let req = match parse_args(&args) {
        Ok(req) => req,
        Err(e) => {
            eprintln!("randomaker: {}", e);
            eprint!("{}", usage());
            return ExitCode::FAILURE;
        }
    };
    // out-of-domain parameters take the same exit path as malformed arguments
    let sampler = match build_sampler(&req) {
        Ok(sampler) => sampler,
        Err(e) => {
            eprintln!("randomaker: {:#}", e);
            eprint!("{}", usage());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = generate(&req, sampler.as_ref()) {
        eprintln!("randomaker: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
