//! Adaptive Gauss–Kronrod quadrature with epsilon-algorithm extrapolation.
//!
//! Every range is integrated as a function of `t` on `[0, 1]`: infinite ends
//! are mapped with `x = (1 - t) / t`, finite pieces linearly. The driver is the
//! QUADPACK QAGI scheme. It bisects the subinterval with the largest error
//! estimate, watches for roundoff, and once only small subintervals remain it
//! accelerates the sequence of partial sums with Wynn's epsilon algorithm.
//! The 15-point Kronrod rule assumes a smooth integrand, so callers split the
//! real line at the points where it is not ([`integrate_piecewise`]).

use tracing::debug;

/// Kronrod abscissae on `[-1, 1]`; the last entry is the centre.
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

/// Gauss weights aligned with `XGK`; zero where the node is Kronrod-only.
const WG: [f64; 8] = [
    0.0,
    0.129484966168869693270611432679082,
    0.0,
    0.279705391489276667901467771423780,
    0.0,
    0.381830050505118944950369775488975,
    0.0,
    0.417959183673469387755102040816327,
];

pub const DEFAULT_SUBDIVISION_LIMIT: usize = 50;

const EPSILON_TABLE_SIZE: usize = 52;
const EPSILON_TABLE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    pub value: f64,
    /// Estimated absolute error of `value`.
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureSettings {
    pub epsabs: f64,
    pub epsrel: f64,
    pub limit: usize,
}

impl QuadratureSettings {
    pub fn new(epsabs: f64, epsrel: f64) -> Self {
        Self {
            epsabs,
            epsrel,
            limit: DEFAULT_SUBDIVISION_LIMIT,
        }
    }
}

/// Range of integration, each with its substitution onto `t` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    RealLine,
    /// `[from, inf)`
    UpperTail(f64),
    /// `(-inf, to]`
    LowerTail(f64),
    Finite(f64, f64),
}

impl Domain {
    #[inline]
    fn eval<F: Fn(f64) -> f64>(&self, f: &F, t: f64) -> f64 {
        match *self {
            Domain::RealLine => {
                let x = (1.0 - t) / t;
                ((f(x) + f(-x)) / t) / t
            }
            Domain::UpperTail(from) => (f(from + (1.0 - t) / t) / t) / t,
            Domain::LowerTail(to) => (f(to - (1.0 - t) / t) / t) / t,
            Domain::Finite(a, b) => f(a + (b - a) * t) * (b - a),
        }
    }
}

/// Why the driver stopped short of the requested tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortfall {
    SubdivisionLimit,
    Roundoff,
    ExtrapolationRoundoff,
    BadIntegrand,
    NoConvergence,
    Divergent,
}

struct RuleResult {
    value: f64,
    error: f64,
    resabs: f64,
    resasc: f64,
}

fn kronrod_15<F: Fn(f64) -> f64>(f: &F, domain: &Domain, a: f64, b: f64) -> RuleResult {
    let epmach = f64::EPSILON;
    let uflow = f64::MIN_POSITIVE;

    let centr = 0.5 * (a + b);
    let hlgth = 0.5 * (b - a);

    let fc = domain.eval(f, centr);
    let mut resg = WG[7] * fc;
    let mut resk = WGK[7] * fc;
    let mut resabs = resk.abs();

    let mut fv1 = [0.0; 7];
    let mut fv2 = [0.0; 7];
    for j in 0..7 {
        let absc = hlgth * XGK[j];
        let fval1 = domain.eval(f, centr - absc);
        let fval2 = domain.eval(f, centr + absc);
        fv1[j] = fval1;
        fv2[j] = fval2;
        let fsum = fval1 + fval2;
        resg += WG[j] * fsum;
        resk += WGK[j] * fsum;
        resabs += WGK[j] * (fval1.abs() + fval2.abs());
    }

    let reskh = resk * 0.5;
    let mut resasc = WGK[7] * (fc - reskh).abs();
    for j in 0..7 {
        resasc += WGK[j] * ((fv1[j] - reskh).abs() + (fv2[j] - reskh).abs());
    }

    let value = resk * hlgth;
    resasc *= hlgth;
    resabs *= hlgth;
    let mut error = ((resk - resg) * hlgth).abs();

    if resasc != 0.0 && error != 0.0 {
        error = resasc * (1.0_f64).min((200.0 * error / resasc).powf(1.5));
    }
    if resabs > uflow / (50.0 * epmach) {
        error = error.max(epmach * 50.0 * resabs);
    }

    RuleResult {
        value,
        error,
        resabs,
        resasc,
    }
}

/// Wynn's epsilon table over the sequence of partial sums.
struct EpsilonTable {
    entries: [f64; EPSILON_TABLE_SIZE],
    len: usize,
    recent: [f64; 3],
    calls: usize,
}

impl EpsilonTable {
    fn new(first: f64) -> Self {
        let mut entries = [0.0; EPSILON_TABLE_SIZE];
        entries[0] = first;
        Self {
            entries,
            len: 1,
            recent: [0.0; 3],
            calls: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.entries[self.len] = value;
        self.len += 1;
    }

    /// Returns the extrapolated limit and its error estimate. The error is
    /// `f64::MAX` until three extrapolations have been made.
    fn extrapolate(&mut self) -> (f64, f64) {
        let epmach = f64::EPSILON;
        let oflow = f64::MAX;
        let floor = |result: f64, abserr: f64| abserr.max(5.0 * epmach * result.abs());

        self.calls += 1;
        let mut n = self.len;
        let mut abserr = oflow;
        let mut result = self.entries[n - 1];
        if n < 3 {
            return (result, floor(result, abserr));
        }

        // Indices below are 1-based positions in the table.
        let e = &mut self.entries;
        e[n + 1] = e[n - 1];
        let newelm = (n - 1) / 2;
        e[n - 1] = oflow;
        let num = n;
        let mut k1 = n;
        for i in 1..=newelm {
            let k2 = k1 - 1;
            let k3 = k1 - 2;
            let res = e[k1 + 1];
            let e0 = e[k3 - 1];
            let e1 = e[k2 - 1];
            let e2 = res;
            let e1abs = e1.abs();
            let delta2 = e2 - e1;
            let err2 = delta2.abs();
            let tol2 = e2.abs().max(e1abs) * epmach;
            let delta3 = e1 - e0;
            let err3 = delta3.abs();
            let tol3 = e1abs.max(e0.abs()) * epmach;
            if err2 <= tol2 && err3 <= tol3 {
                // Converged to machine accuracy.
                return (res, floor(res, err2 + err3));
            }

            let e3 = e[k1 - 1];
            e[k1 - 1] = e1;
            let delta1 = e1 - e3;
            let err1 = delta1.abs();
            let tol1 = e1abs.max(e3.abs()) * epmach;
            if err1 <= tol1 || err2 <= tol2 || err3 <= tol3 {
                n = i + i - 1;
                break;
            }

            let ss = 1.0 / delta1 + 1.0 / delta2 - 1.0 / delta3;
            let epsinf = (ss * e1).abs();
            if epsinf <= 1.0e-4 {
                n = i + i - 1;
                break;
            }

            let res = e1 + 1.0 / ss;
            e[k1 - 1] = res;
            k1 -= 2;
            let error = err2 + (res - e2).abs() + err3;
            if error <= abserr {
                abserr = error;
                result = res;
            }
        }

        if n == EPSILON_TABLE_LIMIT {
            n = 2 * (EPSILON_TABLE_LIMIT / 2) - 1;
        }
        let mut ib = if num % 2 == 1 { 1 } else { 2 };
        for _ in 0..=newelm {
            e[ib - 1] = e[ib + 1];
            ib += 2;
        }
        if num != n {
            let mut indx = num - n + 1;
            for i in 0..n {
                e[i] = e[indx - 1];
                indx += 1;
            }
        }
        self.len = n;

        if self.calls < 4 {
            self.recent[self.calls - 1] = result;
            abserr = oflow;
        } else {
            let [r1, r2, r3] = self.recent;
            abserr = (result - r3).abs() + (result - r2).abs() + (result - r1).abs();
            self.recent = [r2, r3, result];
        }
        (result, floor(result, abserr))
    }
}

/// Subintervals of `[0, 1]` with their estimates. Slot 0 is unused so that
/// slot `k` holds the `k`-th subinterval; `order` lists slots by decreasing
/// error, at least for the leading entries.
struct Subintervals {
    lower: Vec<f64>,
    upper: Vec<f64>,
    value: Vec<f64>,
    error: Vec<f64>,
    order: Vec<usize>,
    limit: usize,
}

impl Subintervals {
    fn new(limit: usize, value: f64, error: f64) -> Self {
        let mut this = Self {
            lower: vec![0.0; limit + 1],
            upper: vec![0.0; limit + 1],
            value: vec![0.0; limit + 1],
            error: vec![0.0; limit + 1],
            order: vec![0; limit + 1],
            limit,
        };
        this.upper[1] = 1.0;
        this.value[1] = value;
        this.error[1] = error;
        this.order[1] = 1;
        this
    }

    fn width(&self, slot: usize) -> f64 {
        (self.upper[slot] - self.lower[slot]).abs()
    }

    /// Restores the descending error order after `maxerr` was bisected into
    /// `maxerr` and `last`, and returns the slot to bisect next. Only the
    /// first `limit + 2 - last` positions are kept sorted.
    fn reorder(&mut self, last: usize, maxerr: usize, nrmax: &mut usize) -> usize {
        let limit = self.limit;
        let order = &mut self.order;
        let error = &self.error;

        if last <= 2 {
            order[1] = 1;
            order[2] = 2;
            return order[*nrmax];
        }

        let errmax = error[maxerr];
        if *nrmax != 1 {
            for _ in 1..*nrmax {
                let isucc = order[*nrmax - 1];
                if errmax <= error[isucc] {
                    break;
                }
                order[*nrmax] = isucc;
                *nrmax -= 1;
            }
        }

        let jupbn = if last > limit / 2 + 2 {
            limit + 3 - last
        } else {
            last
        };
        let errmin = error[last];
        let jbnd = jupbn - 1;
        let ibeg = *nrmax + 1;

        for i in ibeg..=jbnd {
            let isucc = order[i];
            if errmax >= error[isucc] {
                order[i - 1] = maxerr;
                let mut k = jbnd;
                for _ in i..=jbnd {
                    let isucc = order[k];
                    if errmin < error[isucc] {
                        order[k + 1] = last;
                        return order[*nrmax];
                    }
                    order[k + 1] = isucc;
                    k -= 1;
                }
                order[i] = last;
                return order[*nrmax];
            }
            order[i - 1] = isucc;
        }

        order[jbnd] = maxerr;
        order[jupbn] = last;
        order[*nrmax]
    }

    fn total(&self, last: usize) -> f64 {
        self.value[1..=last].iter().sum()
    }
}

fn finish(value: f64, error: f64, shortfall: Option<Shortfall>) -> Integral {
    if let Some(reason) = shortfall {
        debug!(
            value,
            error,
            ?reason,
            "Quadrature stopped before reaching the requested tolerance."
        );
    }
    Integral { value, error }
}

/// Integrates `f` over `domain`.
///
/// Failing to reach the tolerance is not an error: the best estimate is
/// returned together with its (larger) error estimate.
pub fn integrate<F: Fn(f64) -> f64>(
    f: &F,
    domain: Domain,
    settings: &QuadratureSettings,
) -> Integral {
    let epmach = f64::EPSILON;
    let uflow = f64::MIN_POSITIVE;
    let oflow = f64::MAX;
    let QuadratureSettings {
        epsabs, epsrel, ..
    } = *settings;
    let limit = settings.limit.max(1);
    let mut shortfall = None;

    let first = kronrod_15(f, &domain, 0.0, 1.0);
    let mut result = first.value;
    let mut abserr = first.error;
    let defabs = first.resabs;
    let dres = result.abs();
    let mut errbnd = epsabs.max(epsrel * dres);

    if abserr <= 100.0 * epmach * defabs && abserr > errbnd {
        shortfall = Some(Shortfall::Roundoff);
    }
    if limit == 1 {
        shortfall = Some(Shortfall::SubdivisionLimit);
    }
    if shortfall.is_some() || (abserr <= errbnd && abserr != first.resasc) || abserr == 0.0 {
        return finish(result, abserr, shortfall);
    }

    let mut intervals = Subintervals::new(limit, result, abserr);
    let mut table = EpsilonTable::new(result);
    let mut errmax = abserr;
    let mut maxerr = 1;
    let mut area = result;
    let mut errsum = abserr;
    abserr = oflow;
    let mut nrmax = 1;
    let mut ktmin = 0;
    let mut extrap = false;
    let mut noext = false;
    let mut table_roundoff = false;
    let (mut iroff1, mut iroff2, mut iroff3) = (0, 0, 0);
    let positive = dres >= (1.0 - 50.0 * epmach) * defabs;
    let mut small = 0.0;
    let mut erlarg = 0.0;
    let mut ertest = 0.0;
    let mut correc = 0.0;
    let mut last = 1;
    let mut converged_by_sum = false;

    for step in 2..=limit {
        last = step;
        let a1 = intervals.lower[maxerr];
        let b1 = 0.5 * (intervals.lower[maxerr] + intervals.upper[maxerr]);
        let a2 = b1;
        let b2 = intervals.upper[maxerr];
        let erlast = errmax;

        let left = kronrod_15(f, &domain, a1, b1);
        let right = kronrod_15(f, &domain, a2, b2);
        let (area1, error1) = (left.value, left.error);
        let (area2, error2) = (right.value, right.error);
        let area12 = area1 + area2;
        let erro12 = error1 + error2;
        errsum = errsum + erro12 - errmax;
        area = area + area12 - intervals.value[maxerr];

        if left.resasc != error1 && right.resasc != error2 {
            if (intervals.value[maxerr] - area12).abs() <= 1.0e-5 * area12.abs()
                && erro12 >= 0.99 * errmax
            {
                if extrap {
                    iroff2 += 1;
                } else {
                    iroff1 += 1;
                }
            }
            if last > 10 && erro12 > errmax {
                iroff3 += 1;
            }
        }
        intervals.value[maxerr] = area1;
        intervals.value[last] = area2;
        errbnd = epsabs.max(epsrel * area.abs());

        if iroff1 + iroff2 >= 10 || iroff3 >= 20 {
            shortfall = Some(Shortfall::Roundoff);
        }
        if iroff2 >= 5 {
            table_roundoff = true;
        }
        if last == limit {
            shortfall = Some(Shortfall::SubdivisionLimit);
        }
        if a1.abs().max(b2.abs()) <= (1.0 + 100.0 * epmach) * (a2.abs() + 1000.0 * uflow) {
            shortfall = Some(Shortfall::BadIntegrand);
        }

        if error2 <= error1 {
            intervals.lower[last] = a2;
            intervals.upper[maxerr] = b1;
            intervals.upper[last] = b2;
            intervals.error[maxerr] = error1;
            intervals.error[last] = error2;
        } else {
            intervals.lower[maxerr] = a2;
            intervals.lower[last] = a1;
            intervals.upper[last] = b1;
            intervals.value[maxerr] = area2;
            intervals.value[last] = area1;
            intervals.error[maxerr] = error2;
            intervals.error[last] = error1;
        }

        maxerr = intervals.reorder(last, maxerr, &mut nrmax);
        errmax = intervals.error[maxerr];
        if errsum <= errbnd {
            converged_by_sum = true;
            break;
        }
        if shortfall.is_some() {
            break;
        }
        if last == 2 {
            small = 0.375;
            erlarg = errsum;
            ertest = errbnd;
            table.push(area);
            continue;
        }
        if noext {
            continue;
        }

        erlarg -= erlast;
        if (b1 - a1).abs() > small {
            erlarg += erro12;
        }
        if !extrap {
            if intervals.width(maxerr) > small {
                continue;
            }
            extrap = true;
            nrmax = 2;
        }

        if !table_roundoff && erlarg > ertest {
            // Keep bisecting while large subintervals carry the error.
            let jupbnd = if last > 2 + limit / 2 {
                limit + 3 - last
            } else {
                last
            };
            let mut large_remaining = false;
            for _ in nrmax..=jupbnd {
                maxerr = intervals.order[nrmax];
                errmax = intervals.error[maxerr];
                if intervals.width(maxerr) > small {
                    large_remaining = true;
                    break;
                }
                nrmax += 1;
            }
            if large_remaining {
                continue;
            }
        }

        table.push(area);
        let (reseps, abseps) = table.extrapolate();
        ktmin += 1;
        if ktmin > 5 && abserr < 1.0e-3 * errsum {
            shortfall = Some(Shortfall::NoConvergence);
        }
        if abseps < abserr {
            ktmin = 0;
            abserr = abseps;
            result = reseps;
            correc = erlarg;
            ertest = epsabs.max(epsrel * reseps.abs());
            if abserr <= ertest {
                break;
            }
        }
        if table.len == 1 {
            noext = true;
        }
        if shortfall == Some(Shortfall::NoConvergence) {
            break;
        }

        maxerr = intervals.order[1];
        errmax = intervals.error[maxerr];
        nrmax = 1;
        extrap = false;
        small *= 0.5;
        erlarg = errsum;
    }

    if converged_by_sum || abserr == oflow {
        return finish(intervals.total(last), errsum, shortfall);
    }

    if shortfall.is_some() || table_roundoff {
        if table_roundoff {
            abserr += correc;
        }
        shortfall.get_or_insert(Shortfall::ExtrapolationRoundoff);
        if result != 0.0 && area != 0.0 {
            if abserr / result.abs() > errsum / area.abs() {
                return finish(intervals.total(last), errsum, shortfall);
            }
        } else if abserr > errsum {
            return finish(intervals.total(last), errsum, shortfall);
        } else if area == 0.0 {
            return finish(result, abserr, shortfall);
        }
    }

    if positive || result.abs().max(area.abs()) > defabs * 0.01 {
        let ratio = result / area;
        if !(0.01..=100.0).contains(&ratio) || errsum > area.abs() {
            shortfall = Some(Shortfall::Divergent);
        }
    }
    finish(result, abserr, shortfall)
}

/// Integrates `f` over the real line, split at `points` (sorted ascending).
/// The error estimates of the pieces are summed.
pub fn integrate_piecewise<F: Fn(f64) -> f64>(
    f: F,
    points: &[f64],
    settings: &QuadratureSettings,
) -> Integral {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return integrate(&f, Domain::RealLine, settings);
    };

    let pieces = std::iter::once(Domain::LowerTail(first))
        .chain(points.windows(2).map(|pair| Domain::Finite(pair[0], pair[1])))
        .chain(std::iter::once(Domain::UpperTail(last)));

    let mut total = Integral {
        value: 0.0,
        error: 0.0,
    };
    for domain in pieces {
        let piece = integrate(&f, domain, settings);
        total.value += piece.value;
        total.error += piece.error;
    }
    total
}
